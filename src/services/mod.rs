pub mod dispatcher;
pub mod generator;
pub mod reference;
