use yew::prelude::*;

#[derive(Properties, PartialEq, Eq, Clone)]
pub struct Props {
    pub message: AttrValue,
}

#[function_component(SuccessBanner)]
pub fn success_banner(p: &Props) -> Html {
    html! {
        <div class="runbook-success" role="status">
            <span class="success-icon" aria-hidden="true">{ "✓" }</span>
            <div>
                <p class="success-title">{ "Incident resolved" }</p>
                <p class="success-message">{ p.message.clone() }</p>
            </div>
        </div>
    }
}
