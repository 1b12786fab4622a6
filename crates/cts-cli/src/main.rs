mod cli;
mod commands;
mod logging;

use cli::{AddFailuresParams, FormatParams, UpdateParams, ValidateParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();
    logging::init(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("update", m)) => {
            let params = UpdateParams::from_matches(m);
            commands::update::run(params.into());
        }
        Some(("validate", m)) => {
            let params = ValidateParams::from_matches(m);
            commands::validate::run(params.into());
        }
        Some(("format", m)) => {
            let params = FormatParams::from_matches(m);
            commands::format::run(params.into());
        }
        Some(("add-failures", m)) => {
            let params = AddFailuresParams::from_matches(m);
            commands::add_failures::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
