use crate::game::Rank;
use yew::prelude::*;

#[derive(Properties, PartialEq, Eq, Clone)]
pub struct Props {
    pub score: u32,
}

#[function_component(ScoreBadge)]
pub fn score_badge(p: &Props) -> Html {
    let rank = Rank::from_score(p.score);
    let next_hint = rank.next_threshold().map_or_else(
        || "Top tier reached".to_string(),
        |threshold| format!("Next tier at {threshold}"),
    );
    html! {
        <div class="score-row" aria-live="polite">
            <span class="score-chip" id="rb-score">
                <span class="score-label">{ "Score" }</span>
                <span class="score-value">{ p.score.to_string() }</span>
            </span>
            <span
                class={classes!("rank-badge", format!("rank-{}", rank.tone()))}
                title={next_hint}
                data-rank={rank.label()}
            >
                { rank.to_string() }
            </span>
        </div>
    }
}
