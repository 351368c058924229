pub mod datatype;
pub mod device;
pub mod errors;
pub mod model;
pub mod reply;
pub mod script;
pub mod tensor;
