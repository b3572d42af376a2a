use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{BusError, Result};
use crate::traits::{I2cMaster, Operation, OperationFlags, SlaveAddress};

const I2C_SLAVE: libc::c_ulong = 0x0703;
const I2C_PEC: libc::c_ulong = 0x0708;
const I2C_SMBUS: libc::c_ulong = 0x0720;

const I2C_SMBUS_READ: u8 = 1;
const I2C_SMBUS_WRITE: u8 = 0;
const I2C_SMBUS_BLOCK_DATA: u32 = 5;
const I2C_SMBUS_BLOCK_MAX: usize = 32;

#[repr(C, align(2))]
struct SmbusData {
    block: [u8; I2C_SMBUS_BLOCK_MAX + 2],
}

#[repr(C)]
struct SmbusIoctlData {
    read_write: u8,
    command: u8,
    size: u32,
    data: *mut SmbusData,
}

/// Bus master backed by a Linux `/dev/i2c-N` character device.
///
/// Only the two request shapes SSIF uses are supported:
/// - a single block write `[command, length, data...]`
/// - a one-byte command write followed by a read, issued as an SMBus block read
///
/// PEC is computed and checked by the kernel when the write carries
/// [`OperationFlags::SMBUS_PEC`].
#[derive(Debug)]
pub struct LinuxI2cMaster {
    file: File,
    path: PathBuf,
    current_address: Option<SlaveAddress>,
    pec_enabled: Option<bool>,
}

impl LinuxI2cMaster {
    /// Open an i2c-dev adapter, e.g. `/dev/i2c-1`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| BusError::Open {
                path: path.clone(),
                source,
            })?;
        debug!(?path, "opened i2c adapter");
        Ok(Self {
            file,
            path,
            current_address: None,
            pec_enabled: None,
        })
    }

    /// Path of the adapter device node.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn select(&mut self, address: SlaveAddress, pec: bool) -> Result<()> {
        if self.current_address != Some(address) {
            self.ioctl_arg(I2C_SLAVE, libc::c_ulong::from(address.get()), address)?;
            self.current_address = Some(address);
        }
        if self.pec_enabled != Some(pec) {
            self.ioctl_arg(I2C_PEC, libc::c_ulong::from(pec), address)?;
            self.pec_enabled = Some(pec);
        }
        Ok(())
    }

    fn ioctl_arg(
        &self,
        request: libc::c_ulong,
        arg: libc::c_ulong,
        address: SlaveAddress,
    ) -> Result<()> {
        // SAFETY: `request` is one of the i2c-dev ioctls taking an integer
        // argument, and the descriptor is owned by `self.file`.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, arg) };
        if rc < 0 {
            return Err(map_os_error(address, std::io::Error::last_os_error()));
        }
        Ok(())
    }

    fn smbus(
        &self,
        address: SlaveAddress,
        read_write: u8,
        command: u8,
        data: &mut SmbusData,
    ) -> Result<()> {
        let mut args = SmbusIoctlData {
            read_write,
            command,
            size: I2C_SMBUS_BLOCK_DATA,
            data: data as *mut SmbusData,
        };
        // SAFETY: `args` and the `SmbusData` it points to are live for the
        // duration of the call and match the kernel's `i2c_smbus_ioctl_data`
        // and `i2c_smbus_data` layouts.
        let rc = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                I2C_SMBUS as _,
                &mut args as *mut SmbusIoctlData,
            )
        };
        if rc < 0 {
            return Err(map_os_error(address, std::io::Error::last_os_error()));
        }
        Ok(())
    }

    fn block_write(
        &mut self,
        address: SlaveAddress,
        flags: OperationFlags,
        buf: &[u8],
    ) -> Result<()> {
        let [command, length, payload @ ..] = buf else {
            return Err(BusError::Unsupported("block write shorter than two bytes"));
        };
        if usize::from(*length) != payload.len() || payload.len() > I2C_SMBUS_BLOCK_MAX {
            return Err(BusError::Unsupported("block write length byte does not match data"));
        }

        self.select(address, flags.contains(OperationFlags::SMBUS_PEC))?;

        let mut data = SmbusData {
            block: [0; I2C_SMBUS_BLOCK_MAX + 2],
        };
        data.block[0] = *length;
        data.block[1..=payload.len()].copy_from_slice(payload);

        trace!(%address, command = *command, len = payload.len(), "smbus block write");
        self.smbus(address, I2C_SMBUS_WRITE, *command, &mut data)
    }

    fn block_read(
        &mut self,
        address: SlaveAddress,
        flags: OperationFlags,
        command: u8,
        buf: &mut [u8],
    ) -> Result<()> {
        self.select(address, flags.contains(OperationFlags::SMBUS_PEC))?;

        let mut data = SmbusData {
            block: [0; I2C_SMBUS_BLOCK_MAX + 2],
        };
        self.smbus(address, I2C_SMBUS_READ, command, &mut data)?;

        let length = usize::from(data.block[0]).min(I2C_SMBUS_BLOCK_MAX);
        let copied = (length + 1).min(buf.len());
        buf[..copied].copy_from_slice(&data.block[..copied]);

        trace!(%address, command, len = length, "smbus block read");
        Ok(())
    }
}

impl I2cMaster for LinuxI2cMaster {
    fn start_request(
        &mut self,
        address: SlaveAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<()> {
        match operations {
            [Operation::Write { flags, buf }] if flags.contains(OperationFlags::SMBUS_BLOCK) => {
                self.block_write(address, *flags, *buf)
            }
            [Operation::Write {
                flags,
                buf: command,
            }, Operation::Read { buf, .. }] => {
                let &[command] = *command else {
                    return Err(BusError::Unsupported(
                        "write-then-read needs a single command byte",
                    ));
                };
                self.block_read(address, *flags, command, &mut **buf)
            }
            _ => Err(BusError::Unsupported(
                "expected a block write or a command write followed by a read",
            )),
        }
    }
}

fn map_os_error(address: SlaveAddress, err: std::io::Error) -> BusError {
    match err.raw_os_error() {
        Some(libc::ENXIO) | Some(libc::EREMOTEIO) | Some(libc::EAGAIN) | Some(libc::ETIMEDOUT) => {
            BusError::NoResponse { address }
        }
        Some(libc::ENODEV) => BusError::Unavailable,
        _ => BusError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_adapter_reports_path() {
        let err = LinuxI2cMaster::open("/dev/does-not-exist-i2c-255").unwrap_err();
        match err {
            BusError::Open { path, .. } => {
                assert_eq!(path, PathBuf::from("/dev/does-not-exist-i2c-255"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nack_errnos_map_to_no_response() {
        let address = SlaveAddress::new(0x10);
        for errno in [libc::ENXIO, libc::EREMOTEIO, libc::EAGAIN, libc::ETIMEDOUT] {
            let err = map_os_error(address, std::io::Error::from_raw_os_error(errno));
            assert!(err.is_no_response(), "errno {errno} should be no-response");
        }
        assert!(matches!(
            map_os_error(address, std::io::Error::from_raw_os_error(libc::ENODEV)),
            BusError::Unavailable
        ));
        assert!(matches!(
            map_os_error(address, std::io::Error::from_raw_os_error(libc::EINVAL)),
            BusError::Io(_)
        ));
    }

    #[test]
    fn smbus_data_matches_kernel_union_size() {
        assert_eq!(std::mem::size_of::<SmbusData>(), I2C_SMBUS_BLOCK_MAX + 2);
        assert_eq!(std::mem::align_of::<SmbusData>(), 2);
    }
}
