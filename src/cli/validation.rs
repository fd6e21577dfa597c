use crate::cli::args::CliArgs;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    Weapons,
    Pools,
    Statuses,
}

impl ListKind {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "weapons" | "weapon" => Ok(Self::Weapons),
            "pools" | "pool" => Ok(Self::Pools),
            "statuses" | "status" => Ok(Self::Statuses),
            other => Err(format!(
                "invalid --list '{other}', expected weapons, pools or statuses"
            )),
        }
    }
}

/// Checks that only make sense on the raw flags. Values that can also come
/// from the config file are checked once they are merged, in
/// `app::build_run_config`.
pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.show.is_some() && args.weapon.as_deref().unwrap_or_default().trim().is_empty() {
        return Err("--show requires --weapon".to_string());
    }
    Ok(())
}
