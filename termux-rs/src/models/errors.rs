//! Module errors

/// Represents the different types of errors that can occur in the sampler.
#[derive(Debug)]
pub enum SamplerError {
    /// Error indicating the external sensor command could not be run.
    Command(String),

    /// Error indicating that the sensor output had an unexpected format.
    IncorrectDataFormat(String),

    /// Error indicating that no usable sensors were resolved at startup.
    NoSensors(String),

    /// Error indicating that a durable-log write failed.
    Persistence(String),
}
