//! Registration-time shape checks.

use mortar_extract::{Capabilities, ParamKind};

use crate::path::Template;
use crate::{HandlerKind, HandlerSpec, RegistrationError};

/// Checks a [`HandlerSpec`] before it is admitted to the route tree.
///
/// In order:
/// 1. the return arity matches the registration kind;
/// 2. parameter 0 is the request context;
/// 3. every other parameter is a bound value type;
/// 4. a terminal route's template is well formed;
/// 5. a terminal route whose parameters read path variables declares some.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate(spec: &HandlerSpec) -> Result<(), RegistrationError> {
    let handler = || spec.handler_name().to_string();

    let expected = spec.kind().return_arity();
    if spec.return_arity() != expected {
        return Err(RegistrationError::ReturnArity {
            handler: handler(),
            kind: spec.kind().as_str(),
            expected,
            found: spec.return_arity(),
        });
    }

    let (first, rest) = spec
        .params()
        .split_first()
        .ok_or_else(|| RegistrationError::MissingContext { handler: handler() })?;

    if first.kind != ParamKind::Context {
        return Err(RegistrationError::FirstParamNotContext {
            handler: handler(),
            found: first.type_name.to_string(),
        });
    }

    if let Some((index, param)) = rest
        .iter()
        .enumerate()
        .find(|(_, p)| p.kind != ParamKind::Value)
    {
        return Err(RegistrationError::NonValueParam {
            handler: handler(),
            index: index + 1,
            type_name: param.type_name.to_string(),
        });
    }

    if spec.kind() == HandlerKind::Terminal {
        let template = Template::parse(spec.path())?;
        if template.var_count() == 0 {
            if let Some(param) = rest.iter().find(|p| p.capabilities.contains(Capabilities::PATH)) {
                return Err(RegistrationError::PathCapabilityWithoutVariables {
                    method: spec.method().to_string(),
                    path: spec.path().to_string(),
                    type_name: param.type_name.to_string(),
                });
            }
        }
    }

    Ok(())
}
