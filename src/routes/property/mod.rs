mod form;
mod handler;
mod model;

pub use handler::{add_property, delete_property, dealer_properties, list_properties, update_property};
