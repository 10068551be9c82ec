mod resource_list;

pub use resource_list::{ResourceList, ResourceListEvent};
