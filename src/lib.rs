// Library root
// -----------
// The binary (`main.rs`) only parses arguments, installs logging and maps
// errors to an exit status; everything else lives here so it can be tested
// without spawning the process.
//
// Module responsibilities:
// - `cli`: argument definitions, the verb table and dispatch.
// - `api`: HTTP calls to the marketplace and the payload types they carry.
// - `ui`: reshaping responses into the JSON printed on stdout, plus the
//   request spinner.
// - `config`: base URL and timeout resolution.
// - `error`: the top-level error type.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod ui;
