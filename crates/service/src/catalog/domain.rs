/// Full catalog item record, returned when selection references are resolved.
pub use models::menu_item::Model as MenuItem;
