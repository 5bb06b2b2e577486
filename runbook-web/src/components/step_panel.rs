use crate::game::{Action, Outcome, Step};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub title: AttrValue,
    pub subtitle: AttrValue,
    pub step: Step,
    pub step_index: usize,
    /// Reached flag per step of the scenario.
    pub progress: Vec<bool>,
    #[prop_or_default]
    pub clicked: Option<AttrValue>,
    pub on_action: Callback<String>,
}

/// Styling tone of an action button: the outcome once it has been clicked,
/// idle otherwise.
#[must_use]
pub fn action_tone(action: &Action, clicked: Option<&str>) -> &'static str {
    if clicked == Some(action.id.as_str()) {
        match action.result {
            Outcome::Ok => "tone-ok",
            Outcome::Warn => "tone-warn",
            Outcome::Fail => "tone-fail",
        }
    } else {
        "tone-idle"
    }
}

const fn outcome_glyph(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Ok => "✓",
        Outcome::Warn => "⚠",
        Outcome::Fail => "✗",
    }
}

fn progress_dots(progress: &[bool]) -> Html {
    let dots = progress.iter().map(|reached| {
        html! { <span class={classes!("progress-dot", reached.then_some("progress-reached"))}></span> }
    });
    html! { <div class="runbook-progress" aria-hidden="true">{ for dots }</div> }
}

#[function_component(StepPanel)]
pub fn step_panel(p: &Props) -> Html {
    let clicked = p.clicked.as_deref();
    let actions = p.step.actions.iter().map(|action| {
        let tone = action_tone(action, clicked);
        let glyph = if tone == "tone-idle" {
            "›"
        } else {
            outcome_glyph(action.result)
        };
        let onclick = {
            let on_action = p.on_action.clone();
            let id = action.id.clone();
            Callback::from(move |_| on_action.emit(id.clone()))
        };
        html! {
            <button class={classes!("runbook-action", tone)} data-action={action.id.clone()} {onclick}>
                <span class="action-label">{ action.label.clone() }</span>
                <span class="action-glyph" aria-hidden="true">{ glyph }</span>
            </button>
        }
    });
    let step_counter = format!(
        "Step {} / {} - {}",
        p.step_index + 1,
        p.progress.len(),
        p.step.title
    );
    html! {
        <div class="runbook-step">
            <header class="runbook-header">
                <span class="runbook-play" aria-hidden="true">{ "▶" }</span>
                <h3 class="runbook-title">{ p.title.clone() }</h3>
                <span class="runbook-subtitle muted">{ p.subtitle.clone() }</span>
            </header>
            { progress_dots(&p.progress) }
            <p class="step-counter">{ step_counter }</p>
            <p class="step-prompt">{ p.step.prompt.clone() }</p>
            <div class="runbook-actions" role="group" aria-label="Actions">
                { for actions }
            </div>
        </div>
    }
}
