// rtl-shell - shell session renderer
// Library exports

pub mod cli;
pub mod config;
pub mod host;
pub mod logging;
pub mod protocol;
pub mod render;
pub mod session;
