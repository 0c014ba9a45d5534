//! Sealing helpers for traits that users should not implement for their own types.

pub struct Token;

macro_rules! private_decl {
    () => {
        /// This trait is sealed and can not be implemented outside of this crate.
        #[doc(hidden)]
        fn __private(&self, _: crate::private::Token);
    };
}

macro_rules! private_impl {
    () => {
        fn __private(&self, _: crate::private::Token) {}
    };
}
