#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::{FakePlatform, MockPlatform};
use crate::pal::{Platform, REAL_PLATFORM, RealPlatform};
use crate::SystemStatus;

#[derive(Clone, Debug)]
pub(crate) enum PlatformFacade {
    Real(&'static RealPlatform),

    #[cfg(test)]
    Fake(FakePlatform),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(&REAL_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn fake(platform: FakePlatform) -> Self {
        Self::Fake(platform)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Platform for PlatformFacade {
    fn now_nanos(&self) -> u64 {
        match self {
            Self::Real(p) => p.now_nanos(),
            #[cfg(test)]
            Self::Fake(p) => p.now_nanos(),
            #[cfg(test)]
            Self::Mock(p) => p.now_nanos(),
        }
    }

    fn system_status(&self) -> SystemStatus {
        match self {
            Self::Real(p) => p.system_status(),
            #[cfg(test)]
            Self::Fake(p) => p.system_status(),
            #[cfg(test)]
            Self::Mock(p) => p.system_status(),
        }
    }
}
