//! Interactive runbook simulator.
//!
//! The component owns one [`RunbookEngine`] per catalog; handing it a
//! different catalog starts a fresh engine. Step changes
//! requested by the engine are driven by a `gloo` timeout kept in a slot;
//! replacing or clearing the slot drops the timeout, which cancels the
//! browser timer. The engine's transition token covers the remaining race.
use crate::components::scenario_list::ScenarioList;
use crate::components::score_badge::ScoreBadge;
use crate::components::step_panel::StepPanel;
use crate::components::success_banner::SuccessBanner;
use crate::components::terminal::Terminal;
use crate::game::{
    LocalScoreStore, PendingTransition, RunbookEngine, ScenarioCatalog, ScenarioKey, ScoreStore,
};
use gloo::timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;

type EngineCell<S> = Rc<RefCell<RunbookEngine<S>>>;
type TimerSlot = Rc<RefCell<Option<Timeout>>>;

#[derive(Properties, Clone)]
pub struct Props {
    pub catalog: Rc<ScenarioCatalog>,
    /// Typing effect on the terminal output.
    #[prop_or(true)]
    pub animate: bool,
}

impl PartialEq for Props {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.catalog, &other.catalog) && self.animate == other.animate
    }
}

fn schedule_settle<S>(
    engine: &EngineCell<S>,
    redraw: &UseForceUpdateHandle,
    pending: PendingTransition,
) -> Timeout
where
    S: ScoreStore + 'static,
{
    let engine = Rc::clone(engine);
    let redraw = redraw.clone();
    let millis = u32::try_from(pending.delay.as_millis()).unwrap_or(u32::MAX);
    // A fired timeout stays in its slot until the next action or reset
    // replaces it.
    Timeout::new(millis, move || {
        if engine.borrow_mut().settle(pending.token) {
            redraw.force_update();
        }
    })
}

/// Swap in a fresh engine when `catalog` is not the one `engine` was built
/// on. Returns `true` when the engine was replaced.
fn rebind_catalog(
    engine: &EngineCell<LocalScoreStore>,
    timer: &TimerSlot,
    catalog: &Rc<ScenarioCatalog>,
) -> bool {
    let same = Rc::ptr_eq(engine.borrow().catalog(), catalog);
    if same {
        return false;
    }
    drop(timer.borrow_mut().take());
    *engine.borrow_mut() = RunbookEngine::new(Rc::clone(catalog), LocalScoreStore);
    log::debug!("runbook catalog replaced, engine rebuilt");
    true
}

#[function_component(RunbookSimulator)]
pub fn runbook_simulator(p: &Props) -> Html {
    let engine: EngineCell<LocalScoreStore> = {
        let catalog = Rc::clone(&p.catalog);
        use_mut_ref(move || RunbookEngine::new(catalog, LocalScoreStore))
    };
    let timer: TimerSlot = use_mut_ref(|| None::<Timeout>);
    let redraw = use_force_update();
    rebind_catalog(&engine, &timer, &p.catalog);

    // Unmount: stop the browser timer and drop the engine's pending record.
    {
        let engine = engine.clone();
        let timer = timer.clone();
        use_effect_with((), move |_| {
            move || {
                drop(timer.borrow_mut().take());
                engine.borrow_mut().cancel_pending();
            }
        });
    }

    let on_action = {
        let engine = engine.clone();
        let timer = timer.clone();
        let redraw = redraw.clone();
        Callback::from(move |action_id: String| {
            let applied = engine.borrow_mut().apply_action(&action_id);
            match applied {
                Ok(report) => {
                    let next_timer = report
                        .pending
                        .map(|pending| schedule_settle(&engine, &redraw, pending));
                    // Replacing the slot cancels any earlier timer.
                    drop(timer.replace(next_timer));
                }
                Err(err) => {
                    log::warn!("runbook action rejected: {err}");
                    crate::dom::console_error(&err.to_string());
                }
            }
            redraw.force_update();
        })
    };

    let on_select = {
        let engine = engine.clone();
        let timer = timer.clone();
        let redraw = redraw.clone();
        Callback::from(move |key: ScenarioKey| {
            drop(timer.borrow_mut().take());
            if let Err(err) = engine.borrow_mut().select_scenario(key) {
                log::warn!("scenario switch rejected: {err}");
            }
            redraw.force_update();
        })
    };

    let on_reset_scenario = {
        let engine = engine.clone();
        let timer = timer.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            drop(timer.borrow_mut().take());
            engine.borrow_mut().reset_scenario();
            redraw.force_update();
        })
    };

    let on_reset_score = {
        let engine = engine.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            engine.borrow_mut().reset_score();
            redraw.force_update();
        })
    };

    let state = engine.borrow();
    let scenario = state.scenario();
    let success = state.is_resolved().then(|| {
        html! { <SuccessBanner message={AttrValue::from(scenario.success_message.clone())} /> }
    });

    html! {
        <section id="runbooks" class="panel runbook-simulator" aria-labelledby="runbooks-title">
            <header class="section-header">
                <h2 id="runbooks-title">{ "Runbook Simulator" }</h2>
                <p class="muted">{ "Practice incident response on Kubernetes, CI/CD, network and cloud. Pick actions and earn points." }</p>
            </header>
            <div class="runbook-toolbar">
                <ScoreBadge score={state.score()} />
                <div class="runbook-controls">
                    <button id="rb-reset-scenario" class="retro-btn" onclick={on_reset_scenario}>{ "Reset scenario" }</button>
                    <button id="rb-reset-score" class="retro-btn" onclick={on_reset_score}>{ "Reset score" }</button>
                </div>
            </div>
            <div class="runbook-grid">
                <ScenarioList
                    catalog={Rc::clone(state.catalog())}
                    active={state.active_key()}
                    {on_select}
                />
                <div class="runbook-body">
                    <StepPanel
                        title={AttrValue::from(scenario.title.clone())}
                        subtitle={AttrValue::from(scenario.subtitle.clone())}
                        step={state.current_step().clone()}
                        step_index={state.step_index()}
                        progress={state.progress()}
                        clicked={state.last_action_id().map(|id| AttrValue::from(id.to_string()))}
                        {on_action}
                    />
                    <Terminal
                        text={AttrValue::from(state.transcript_or_placeholder().to_string())}
                        animate={p.animate && !state.transcript().is_empty()}
                    />
                    { success.unwrap_or_default() }
                </div>
            </div>
        </section>
    }
}
