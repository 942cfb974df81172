mod locale_id;
mod plural_category;
mod value;

pub use locale_id::{LocaleError, LocaleId};
pub use plural_category::PluralCategory;
pub use value::{Args, Value};
