//! Test catalog command and query handlers.

mod get_test;
mod list_for_material;

pub use create_test::{CreateTestCommand, CreateTestHandler, CreateTestResult};
pub use delete_test::{DeleteTestCommand, DeleteTestHandler};
pub use get_test::{GetTestHandler, GetTestQuery};
pub use list_for_material::{ListForMaterialHandler, ListForMaterialQuery};
pub use update_test::{UpdateTestCommand, UpdateTestHandler, UpdateTestResult};
