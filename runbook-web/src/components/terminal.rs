//! Simulated terminal showing the last action's transcript.
use gloo::timers::callback::Interval;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use yew::prelude::*;

/// Reveal speed of the typing effect.
pub const TYPEWRITER_CHAR_MS: u32 = 10;

/// The first `chars` characters of `text`, cut on a char boundary.
#[must_use]
pub fn typed_prefix(text: &str, chars: usize) -> &str {
    text.char_indices()
        .nth(chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

/// Character counter for one typing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reveal {
    shown: usize,
    total: usize,
}

impl Reveal {
    const fn new(total: usize) -> Self {
        Self { shown: 0, total }
    }

    /// Show one more character. Returns `true` once the whole text is out.
    fn advance(&mut self) -> bool {
        self.shown = (self.shown + 1).min(self.total);
        self.shown == self.total
    }
}

/// Reveal `text` one character per `speed_ms`. A speed of zero shows the
/// whole text at once. The interval is cleared as soon as the last
/// character is shown.
#[hook]
pub fn use_typewriter(text: AttrValue, speed_ms: u32) -> AttrValue {
    let revealed = use_state(|| if speed_ms == 0 { usize::MAX } else { 0 });
    {
        let revealed = revealed.clone();
        use_effect_with((text.clone(), speed_ms), move |(text, speed)| {
            let total = text.chars().count();
            let slot: Rc<RefCell<Option<Interval>>> = Rc::default();
            if *speed == 0 || total == 0 {
                revealed.set(usize::MAX);
            } else {
                revealed.set(0);
                let progress = Rc::new(Cell::new(Reveal::new(total)));
                let stop = Rc::clone(&slot);
                let interval = Interval::new(*speed, move || {
                    let mut reveal = progress.get();
                    let done = reveal.advance();
                    progress.set(reveal);
                    revealed.set(reveal.shown);
                    if done {
                        drop(stop.borrow_mut().take());
                    }
                });
                *slot.borrow_mut() = Some(interval);
            }
            move || drop(slot.borrow_mut().take())
        });
    }
    AttrValue::from(typed_prefix(&text, *revealed).to_string())
}

#[derive(Properties, PartialEq, Eq, Clone)]
pub struct Props {
    pub text: AttrValue,
    #[prop_or(true)]
    pub animate: bool,
}

#[function_component(Terminal)]
pub fn terminal(p: &Props) -> Html {
    let speed = if p.animate { TYPEWRITER_CHAR_MS } else { 0 };
    let body = use_typewriter(p.text.clone(), speed);
    html! {
        <div class="runbook-terminal" role="log" aria-live="polite">
            <div class="terminal-bar">
                <span class="terminal-title">{ "output" }</span>
                <span class="terminal-lights" aria-hidden="true">
                    <span class="light light-rose"></span>
                    <span class="light light-amber"></span>
                    <span class="light light-emerald"></span>
                </span>
            </div>
            <pre class="terminal-body">{ body }</pre>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use yew::LocalServerRenderer;

    #[test]
    fn prefix_respects_char_boundaries() {
        assert_eq!(typed_prefix("$ kubectl", 3), "$ k");
        assert_eq!(typed_prefix("p95 ≥ 250ms", 5), "p95 ≥");
        assert_eq!(typed_prefix("short", 99), "short");
        assert_eq!(typed_prefix("", 0), "");
    }

    #[test]
    fn reveal_finishes_on_the_last_character() {
        // "$ a\n\nb" is six characters long.
        let mut reveal = Reveal::new("$ a\n\nb".chars().count());
        for _ in 0..5 {
            assert!(!reveal.advance());
        }
        assert!(reveal.advance());
        assert_eq!(reveal.shown, 6);
    }

    #[test]
    fn reveal_never_runs_past_the_text() {
        let mut reveal = Reveal::new(2);
        reveal.advance();
        reveal.advance();
        assert!(reveal.advance());
        assert_eq!(reveal, Reveal { shown: 2, total: 2 });
    }

    #[test]
    fn static_terminal_renders_full_transcript() {
        let props = Props {
            text: AttrValue::from("$ Open Grafana\n\np95 at 780ms"),
            animate: false,
        };
        let html = block_on(LocalServerRenderer::<Terminal>::with_props(props).render());
        assert!(html.contains("p95 at 780ms"), "{html}");
    }
}
