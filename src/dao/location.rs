use futures::{
    FutureExt, StreamExt,
    future::{self, BoxFuture},
    stream::{self, BoxStream},
};
use uuid::Uuid;

use crate::{dao::error::LocationError, dto::check_in::Coordinates};

/// One ranging sample of a proximity beacon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconReading {
    /// Proximity UUID of the beacon.
    pub uuid: Uuid,
    /// Major value.
    pub major: u16,
    /// Minor value.
    pub minor: u16,
    /// Received signal strength in dBm.
    pub rssi: i16,
}

/// Readings delivered while ranging is active; the stream ends when ranging stops.
pub type BeaconStream = BoxStream<'static, BeaconReading>;

/// Device location and proximity sensing.
pub trait LocationService: Send + Sync {
    /// Resolve the current position.
    fn current_location(&self) -> BoxFuture<'static, Result<Coordinates, LocationError>>;
    /// Begin ranging for beacons advertising `uuid`.
    fn start_beacon_ranging(&self, uuid: Uuid) -> Result<BeaconStream, LocationError>;
    /// Stop any ranging in progress. Safe to call when nothing is ranging.
    fn stop_beacon_ranging(&self);
}

/// Location service reporting a fixed position and never seeing beacons.
///
/// Backs the headless runner, where no sensors exist.
#[derive(Debug, Clone)]
pub struct StaticLocationService {
    coordinates: Option<Coordinates>,
}

impl StaticLocationService {
    /// Always answer with `coordinates`.
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates: Some(coordinates),
        }
    }

    /// Service without any fix; every location request fails.
    pub fn unavailable() -> Self {
        Self { coordinates: None }
    }
}

impl LocationService for StaticLocationService {
    fn current_location(&self) -> BoxFuture<'static, Result<Coordinates, LocationError>> {
        let result = self
            .coordinates
            .ok_or_else(|| LocationError::Unavailable("no static position configured".into()));
        future::ready(result).boxed()
    }

    fn start_beacon_ranging(&self, _uuid: Uuid) -> Result<BeaconStream, LocationError> {
        Ok(stream::pending().boxed())
    }

    fn stop_beacon_ranging(&self) {}
}
