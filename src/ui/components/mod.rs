pub mod card_view;
pub mod drill_summary;
pub mod pack_list;
pub mod question_view;
pub mod tab_bar;
