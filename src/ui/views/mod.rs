mod persona_list;

pub use persona_list::PersonaListView;
