//! Runtime reflection contract consumed by the scene serializer: typed
//! atoms over the native value set, meta-classes with closure-backed
//! property access, reflected objects and transactions, plus the process
//! databases resolving class names and imported object names.

pub mod atom;
pub mod database;
pub mod meta_class;
pub mod name;
pub mod object;
pub mod reflected;
pub mod transaction;

pub use atom::*;
pub use database::*;
pub use meta_class::*;
pub use name::Name;
pub use object::*;
pub use reflected::*;
pub use transaction::*;
