//! Runtime values of the engine.

mod map;
mod object;
mod value;


pub use map::{MapKey, MapValue};
pub use object::{
    Adder, Comparer, Container, Divider, Indexer, Modder, Multiplier, Negater, Object, Sizer,
    Subtractor,
};
pub(crate) use value::Number;
pub use value::Value;
