use crate::components::runbook_simulator::RunbookSimulator;
use crate::game::builtin_catalog;
use yew::prelude::*;

/// Root component mounted by the wasm entry point.
///
/// Loads the embedded scenario catalog once and hands it to the simulator;
/// a malformed asset renders an error panel instead.
#[function_component(App)]
pub fn app() -> Html {
    let catalog = use_memo((), |_| builtin_catalog().map_err(|err| err.to_string()));
    match catalog.as_ref() {
        Ok(catalog) => html! {
            <main id="main" role="main">
                <RunbookSimulator catalog={catalog.clone()} />
            </main>
        },
        Err(message) => {
            log::error!("runbook catalog failed to load: {message}");
            html! {
                <main id="main" role="main">
                    <section class="panel error" role="alert">
                        <h2>{ "Runbook Simulator unavailable" }</h2>
                        <p class="muted">{ message.clone() }</p>
                    </section>
                </main>
            }
        }
    }
}
