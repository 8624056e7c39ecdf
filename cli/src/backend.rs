//! Compile-time backend selection for the evaluation tools.
//!
//! The numeric backend is fixed by cargo feature flags so every binary in
//! this crate runs the classifier on the same device kind. Evaluation is
//! inference-only, so no autodiff backend is wired up.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "cuda")] {
        use burn::backend::cuda::{Cuda, CudaDevice};

        /// Backend the classifier runs on.
        pub type SelectedBackend = Cuda;
        /// Device type matching [`SelectedBackend`].
        pub type SelectedDevice = CudaDevice;

        /// Default device for the compiled-in backend.
        pub fn create_device() -> SelectedDevice {
            CudaDevice::default()
        }

        /// Human-readable backend name for the startup banner.
        pub const fn get_backend_name() -> &'static str {
            "CUDA (NVIDIA GPU)"
        }
    } else if #[cfg(feature = "wgpu")] {
        use burn::backend::wgpu::{Wgpu, WgpuDevice};

        /// Backend the classifier runs on.
        pub type SelectedBackend = Wgpu;
        /// Device type matching [`SelectedBackend`].
        pub type SelectedDevice = WgpuDevice;

        /// Default device for the compiled-in backend.
        pub fn create_device() -> SelectedDevice {
            WgpuDevice::default()
        }

        /// Human-readable backend name for the startup banner.
        pub const fn get_backend_name() -> &'static str {
            "WGPU (GPU)"
        }
    } else {
        // CPU fallback when no GPU feature is enabled.
        use burn::backend::ndarray::{NdArray, NdArrayDevice};

        /// Backend the classifier runs on.
        pub type SelectedBackend = NdArray;
        /// Device type matching [`SelectedBackend`].
        pub type SelectedDevice = NdArrayDevice;

        /// Default device for the compiled-in backend.
        pub fn create_device() -> SelectedDevice {
            NdArrayDevice::default()
        }

        /// Human-readable backend name for the startup banner.
        pub const fn get_backend_name() -> &'static str {
            "NdArray (CPU)"
        }
    }
}
