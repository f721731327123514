mod common;
mod resync;
