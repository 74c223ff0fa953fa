use std::ffi::OsString;

/// Command line switches the updater reacts to. Everything else is left for
/// the application and forwarded on relaunch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Check the host binary even in development builds.
    pub force_update: bool,
    /// Do not start the new binary after replacing the running one.
    pub no_relaunch: bool,
    pub debug: bool,
}

impl Flags {
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    #[must_use]
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = Self::default();
        for arg in args {
            match switch(arg.as_ref()) {
                Some(Switch::Update) => flags.force_update = true,
                Some(Switch::NoRelaunch) => flags.no_relaunch = true,
                Some(Switch::Debug) => flags.debug = true,
                None => {}
            }
        }
        flags
    }
}

/// Arguments to hand to the relaunched process, minus the switches above.
#[must_use]
pub fn forwarded_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .filter(|arg| arg.to_str().and_then(switch).is_none())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Switch {
    Update,
    NoRelaunch,
    Debug,
}

fn switch(arg: &str) -> Option<Switch> {
    let name = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-'))?;
    match name.to_ascii_lowercase().as_str() {
        "update" => Some(Switch::Update),
        "norelaunch" => Some(Switch::NoRelaunch),
        "debug" => Some(Switch::Debug),
        _ => None,
    }
}
