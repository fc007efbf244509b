pub mod cli;
pub mod error;

pub mod commands {
    pub mod validate;
}

pub mod core {
    pub mod allele;
    pub mod breakend;
    pub mod classify;
    pub mod config;
    pub mod diagnostic;
    pub mod header;
    pub mod interval;
    pub mod output;
    pub mod record;
    pub mod reference;
    pub mod scan_state;
    pub mod svtype;
    pub mod validator;
    #[cfg(test)]
    pub mod test_utils;
}

pub mod io {
    pub mod metadata_reader;
    pub mod readers;
    pub mod report_writer;
}

pub mod utils {
    pub mod util;
}

pub mod constants;

pub use constants::*;
