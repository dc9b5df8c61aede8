//! Configuration access port trait.

pub trait ConfigPort {
    /// Raw value of `key`; typed parsing is left to the caller.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// Section names, lower-cased.
    fn sections(&self) -> Vec<String>;
}
