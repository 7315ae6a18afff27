use thiserror::Error;

// Device-level failures. None of these ever reach a caller of the sound
// service; they are logged and the service goes quiet instead.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no default output device")]
    NoOutputDevice,

    #[error("unsupported sample format {0:?} (only f32 supported for now)")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("could not query output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("could not build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("could not start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("audio session is unavailable")]
    Unavailable,
}
