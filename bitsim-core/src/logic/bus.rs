//! Shared multi-driver bus.
//!
//! Every line of the bus is the OR of the matching bit of each enabled
//! driver. Drivers narrower or wider than the bus are right-aligned, so an
//! 8-bit register on a 16-bit bus drives the low byte.
//!
//! Two enabled drivers with different values are not an error: the levels
//! are OR-ed. [`Bus::enabled_drivers`] lets an observer detect such a
//! contention if it cares.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::bits::{Bits, Resize};
use crate::error::Result;
use crate::reactive::{Memo, Signal, Wire};

/// One source attached to the bus.
#[derive(Debug, Clone)]
pub struct BusDriver {
    name: String,
    output: Wire<Bits>,
    enable: Wire<bool>,
}

impl BusDriver {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the driver's value if it is enabled.
    fn driving(&self) -> Result<Option<Bits>> {
        if self.enable.get()? {
            Ok(Some(self.output.get()?))
        } else {
            Ok(None)
        }
    }
}

#[derive(Clone)]
pub struct Bus {
    width: usize,
    drivers: Arc<RwLock<Vec<BusDriver>>>,
    /// Bumped whenever a driver is attached so line memos re-read the list.
    revision: Signal<u64>,
    lines: Vec<Memo<bool>>,
    value: Memo<Bits>,
}

impl Bus {
    pub fn new(width: usize) -> Self {
        let drivers: Arc<RwLock<Vec<BusDriver>>> = Arc::new(RwLock::new(Vec::new()));
        let revision = Signal::new(0u64);

        let lines: Vec<Memo<bool>> = (0..width)
            .map(|index| {
                let drivers = drivers.clone();
                let revision = revision.clone();
                Memo::new(move || {
                    revision.get();
                    let attached = drivers.read().clone();
                    for driver in &attached {
                        if let Some(bits) = driver.driving()? {
                            if bits.resize(width, Resize::RightAligned).bit(index) {
                                return Ok(true);
                            }
                        }
                    }
                    Ok(false)
                })
            })
            .collect();

        let value = {
            let lines = lines.clone();
            Memo::new(move || {
                let levels = lines
                    .iter()
                    .map(Memo::get)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Bits::from_bools(levels))
            })
        };

        Self {
            width,
            drivers,
            revision,
            lines,
            value,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Attach a driver that puts `output` on the bus while `enable` is high.
    pub fn attach(
        &self,
        name: impl Into<String>,
        output: impl Into<Wire<Bits>>,
        enable: impl Into<Wire<bool>>,
    ) {
        let driver = BusDriver {
            name: name.into(),
            output: output.into(),
            enable: enable.into(),
        };
        debug!(driver = %driver.name, "bus driver attached");
        self.drivers.write().push(driver);
        self.revision.update(|r| r + 1);
    }

    /// Level of line `index`, counting from the most-significant end.
    pub fn line(&self, index: usize) -> Option<Wire<bool>> {
        self.lines.get(index).map(Wire::from)
    }

    /// The whole bus as a bit vector.
    pub fn output(&self) -> Wire<Bits> {
        Wire::from(&self.value)
    }

    pub fn value(&self) -> Result<Bits> {
        self.value.get()
    }

    /// Names of the drivers currently enabled, in attach order.
    pub fn enabled_drivers(&self) -> Result<Vec<String>> {
        let attached = self.drivers.read().clone();
        let mut enabled = Vec::new();
        for driver in attached {
            if driver.enable.get()? {
                enabled.push(driver.name);
            }
        }
        Ok(enabled)
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.read().len()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("width", &self.width)
            .field("drivers", &self.driver_count())
            .finish()
    }
}
