pub(crate) mod utils;

const PROG_NAME: &str = "envelope";
