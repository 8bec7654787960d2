//! Human-readable verdict messages

use crate::classify::SystemType;
use crate::report::ValidationMode;

/// Inputs that select the report message
#[derive(Debug, Clone, Copy)]
pub struct MessageInputs {
    pub mode: ValidationMode,
    pub has_signatures: bool,
    pub system_type: SystemType,
    pub is_modified: bool,
    pub signature_count: usize,
    pub valid: usize,
    pub total: usize,
}

/// First matching rule wins
pub fn report_message(inputs: &MessageInputs) -> String {
    let authoritative = inputs.mode == ValidationMode::FieldEnumeration;

    if !inputs.has_signatures {
        return if authoritative {
            "PDF sin firmas digitales".to_string()
        } else {
            "El PDF no contiene firmas digitales".to_string()
        };
    }
    if inputs.is_modified {
        return "El PDF ha sido modificado después de la firma".to_string();
    }
    if inputs.system_type != SystemType::OwnSystem {
        return "El PDF no fue firmado por nuestro sistema".to_string();
    }
    if authoritative && inputs.valid == 0 {
        return "No se encontraron firmas válidas".to_string();
    }
    if inputs.valid < inputs.total {
        return format!(
            "Algunas firmas son inválidas ({}/{} válidas)",
            inputs.valid, inputs.total
        );
    }
    format!(
        "PDF válido firmado por nuestro sistema ({} indicadores)",
        inputs.signature_count
    )
}
