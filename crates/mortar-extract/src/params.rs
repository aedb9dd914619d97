//! Parameter types and their registration-time descriptors.

use std::any::type_name;

use mortar_core::{ApiError, ErrorRegistry, Exchange, RequestContext};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{bind, Capabilities};

/// A value type that can be bound from an inbound request.
///
/// The binder starts from `Default::default()`, calls
/// [`fill_defaults`](Self::fill_defaults), applies one decode step per
/// declared capability, then calls [`post_validate`](Self::post_validate).
///
/// Types that declare more than one capability should carry
/// `#[serde(default)]`: each step decodes the type from its own source alone,
/// so fields another source provides must not be required there.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use mortar_core::{ApiError, ErrorRegistry};
/// use mortar_extract::{Capabilities, RequestParam};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// #[serde(default)]
/// struct Page {
///     size: u32,
/// }
///
/// impl RequestParam for Page {
///     const CAPABILITIES: Capabilities = Capabilities::QUERY_OR_FORM;
///
///     fn fill_defaults(&mut self) {
///         self.size = 50;
///     }
///
///     fn post_validate(&self) -> Result<(), ApiError> {
///         if self.size > 100 {
///             let mut registry = ErrorRegistry::new();
///             return Err(registry.define(StatusCode::BAD_REQUEST, 100, "page too large"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait RequestParam: Default + Serialize + DeserializeOwned + Send + 'static {
    /// Sources this type is decoded from.
    const CAPABILITIES: Capabilities;

    /// Seeds default field values before any decode step.
    fn fill_defaults(&mut self) {}

    /// Checks the fully decoded value.
    ///
    /// # Errors
    ///
    /// The returned error becomes the request's terminal failure, annotated
    /// with the post-validator tag.
    fn post_validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Kind of a handler parameter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// The per-request context.
    Context,
    /// A bound value type.
    Value,
}

/// Registration-time description of one handler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// Rust type name of the parameter.
    pub type_name: &'static str,
    /// Slot kind.
    pub kind: ParamKind,
    /// Decode capabilities; empty for the context slot.
    pub capabilities: Capabilities,
}

impl ParamDescriptor {
    /// Descriptor of the context slot.
    #[must_use]
    pub fn context() -> Self {
        Self {
            type_name: type_name::<RequestContext>(),
            kind: ParamKind::Context,
            capabilities: Capabilities::NONE,
        }
    }

    /// Descriptor of a bound value slot.
    #[must_use]
    pub fn of<T: RequestParam>() -> Self {
        Self {
            type_name: type_name::<T>(),
            kind: ParamKind::Value,
            capabilities: T::CAPABILITIES,
        }
    }
}

/// An ordered list of [`RequestParam`] types, bound left to right.
///
/// Implemented for tuples of up to eight parameters. Binding stops at the
/// first failing parameter.
pub trait ParamList: Sized + Send + 'static {
    /// Binds every parameter in order.
    ///
    /// # Errors
    ///
    /// Returns the first parameter's binding failure.
    fn bind_all(exchange: &Exchange, registry: &ErrorRegistry) -> Result<Self, ApiError>;

    /// Descriptors of the value slots, in order.
    fn describe() -> Vec<ParamDescriptor>;
}

impl ParamList for () {
    fn bind_all(_exchange: &Exchange, _registry: &ErrorRegistry) -> Result<Self, ApiError> {
        Ok(())
    }

    fn describe() -> Vec<ParamDescriptor> {
        Vec::new()
    }
}

macro_rules! impl_param_list_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: RequestParam),*> ParamList for ($($T,)*) {
            fn bind_all(exchange: &Exchange, registry: &ErrorRegistry) -> Result<Self, ApiError> {
                Ok(($(bind::<$T>(exchange, registry)?,)*))
            }

            fn describe() -> Vec<ParamDescriptor> {
                vec![$(ParamDescriptor::of::<$T>()),*]
            }
        }
    };
}

impl_param_list_for_tuple!(T1);
impl_param_list_for_tuple!(T1, T2);
impl_param_list_for_tuple!(T1, T2, T3);
impl_param_list_for_tuple!(T1, T2, T3, T4);
impl_param_list_for_tuple!(T1, T2, T3, T4, T5);
impl_param_list_for_tuple!(T1, T2, T3, T4, T5, T6);
impl_param_list_for_tuple!(T1, T2, T3, T4, T5, T6, T7);
impl_param_list_for_tuple!(T1, T2, T3, T4, T5, T6, T7, T8);
