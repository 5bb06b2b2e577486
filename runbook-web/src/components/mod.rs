pub mod runbook_simulator;
pub mod scenario_list;
pub mod score_badge;
pub mod step_panel;
pub mod success_banner;
pub mod terminal;
