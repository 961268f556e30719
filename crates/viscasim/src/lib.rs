//! Simulated VISCA-over-IP pan-tilt-zoom camera.
//!
//! viscasim lets controller software be exercised against an emulated camera
//! instead of real hardware. Each TCP connection gets its own simulated
//! device whose pan, tilt, zoom and focus keep moving between commands.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP listener and stream
//! - [`frame`]: Message framing, numeric field codec and reply envelope
//! - [`device`]: Device state, motion model, command dispatch and serving

/// Re-export transport types.
pub mod transport {
    pub use viscasim_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use viscasim_frame::*;
}

/// Re-export device types.
pub mod device {
    pub use viscasim_device::*;
}
