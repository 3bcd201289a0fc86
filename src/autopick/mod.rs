pub mod champ_select;
pub mod settings;
