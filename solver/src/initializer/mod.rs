mod position;
mod velocity;
mod barostat;

pub use position::*;
pub use velocity::*;
pub use barostat::*;
