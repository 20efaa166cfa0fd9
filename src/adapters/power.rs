//! OS power control via `/sbin/shutdown`.

use std::process::Command;

use log::info;

use crate::app::ports::{PowerError, SystemPower};

pub struct OsPower;

impl OsPower {
    fn invoke(&self, flag: &str) -> Result<(), PowerError> {
        let status = Command::new("/sbin/shutdown")
            .arg(flag)
            .arg("now")
            .status()
            .map_err(PowerError::InvokeFailed)?;
        if status.success() {
            Ok(())
        } else {
            Err(PowerError::CommandFailed(status.code().unwrap_or(-1)))
        }
    }
}

impl SystemPower for OsPower {
    fn shutdown(&self) -> Result<(), PowerError> {
        info!("invoking OS halt");
        self.invoke("-h")
    }

    fn reboot(&self) -> Result<(), PowerError> {
        info!("invoking OS reboot");
        self.invoke("-r")
    }
}
