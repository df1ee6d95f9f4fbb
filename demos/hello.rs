#[macro_use]
extern crate trackable;

use clap::{Arg, Command};
use stdlog_shim::{facade, infof, warnf};

fn main() {
    let matches = Command::new("hello")
        .arg(Arg::new("CONFIG_FILE").index(1))
        .arg(
            Arg::new("COUNT")
                .long("count")
                .value_parser(clap::value_parser!(usize))
                .default_value("3"),
        )
        .get_matches();

    if let Some(config_file) = matches.get_one::<String>("CONFIG_FILE") {
        let engine = track_try_unwrap!(stdlog_shim::logger_from_config_as_file(config_file));
        track_try_unwrap!(stdlog_shim::replace_logger(engine));
    }

    let count = matches.get_one::<usize>("COUNT").copied().unwrap_or(3);
    for i in 0..count {
        infof!("Hello #{}", i);
    }
    facade::println(&[&"done:", &count, &"greetings"]);
    warnf!("exiting");
    facade::flush();
}
