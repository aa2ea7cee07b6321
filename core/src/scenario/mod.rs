pub mod collection;
pub mod cursor;
pub mod record;
pub mod workbook;

pub use collection::ScenarioSet;
pub use cursor::ScenarioCursor;
pub use record::Scenario;
pub use workbook::Workbook;
