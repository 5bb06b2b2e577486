use crate::game::{Scenario, ScenarioCatalog, ScenarioKey};
use std::rc::Rc;
use yew::prelude::*;

const ICON_BASE: &str = "static/assets/icons";

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub catalog: Rc<ScenarioCatalog>,
    pub active: ScenarioKey,
    pub on_select: Callback<ScenarioKey>,
}

fn icon_stack(scenario: &Scenario) -> Html {
    let count = scenario.icons.len();
    let icons = scenario.icons.iter().enumerate().map(|(i, icon)| {
        html! {
            <span class="scenario-icon" style={format!("z-index: {}", count - i)}>
                <img src={format!("{ICON_BASE}/{icon}")} alt="" width="28" height="28" />
            </span>
        }
    });
    html! { <div class="scenario-icons" aria-hidden="true">{ for icons }</div> }
}

#[function_component(ScenarioList)]
pub fn scenario_list(p: &Props) -> Html {
    let items = p.catalog.iter().map(|scenario| {
        let key = scenario.key;
        let selected = key == p.active;
        let onclick = {
            let on_select = p.on_select.clone();
            Callback::from(move |_| on_select.emit(key))
        };
        html! {
            <li role="none">
                <button
                    role="tab"
                    id={format!("scenario-{key}")}
                    class={classes!("scenario-item", selected.then_some("scenario-active"))}
                    aria-selected={selected.to_string()}
                    data-key={key.as_str()}
                    {onclick}
                >
                    { icon_stack(scenario) }
                    <span class="scenario-copy">
                        <span class="scenario-title">{ scenario.title.clone() }</span>
                        <span class="scenario-subtitle muted">{ scenario.subtitle.clone() }</span>
                    </span>
                </button>
            </li>
        }
    });
    html! {
        <nav class="scenario-list" aria-label="Scenarios">
            <ul role="tablist">{ for items }</ul>
        </nav>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use yew::LocalServerRenderer;

    #[test]
    fn lists_every_scenario_and_marks_active() {
        let catalog = crate::game::builtin_catalog().unwrap();
        let props = Props {
            catalog,
            active: ScenarioKey::StpLoop,
            on_select: Callback::noop(),
        };
        let html = block_on(LocalServerRenderer::<ScenarioList>::with_props(props).render());
        for key in ScenarioKey::ALL {
            assert!(html.contains(&format!("scenario-{key}")), "{key} missing: {html}");
        }
        assert_eq!(html.matches("scenario-active").count(), 1);
        assert!(html.contains("static/assets/icons/gitlab.svg"));
    }
}
