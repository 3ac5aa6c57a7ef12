//! Mapping of backend rejections to user-facing messages.

use serde::Serialize;
use shared_types::BackendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    ProviderUnavailable,
    BathCapacityExceeded,
    ConflictingAppointment,
    PermissionDenied,
    ValidationFailed,
    Other,
}

/// SQLSTATE `insufficient_privilege`
const PERMISSION_DENIED_CODE: &str = "42501";

/// Lowercase substrings checked against the backend message in order; the
/// first hit wins.
const MESSAGE_TABLE: &[(&str, RejectionKind)] = &[
    ("capacity", RejectionKind::BathCapacityExceeded),
    ("capacidade", RejectionKind::BathCapacityExceeded),
    ("conflict", RejectionKind::ConflictingAppointment),
    ("already booked", RejectionKind::ConflictingAppointment),
    ("permission denied", RejectionKind::PermissionDenied),
    ("not authorized", RejectionKind::PermissionDenied),
    ("provider not available", RejectionKind::ProviderUnavailable),
    ("provider is not available", RejectionKind::ProviderUnavailable),
    ("staff not available", RejectionKind::ProviderUnavailable),
    ("not available", RejectionKind::ProviderUnavailable),
    ("indisponível", RejectionKind::ProviderUnavailable),
    ("validation", RejectionKind::ValidationFailed),
    ("invalid", RejectionKind::ValidationFailed),
];

impl RejectionKind {
    pub fn classify(err: &BackendError) -> Self {
        if err.code.as_deref() == Some(PERMISSION_DENIED_CODE) {
            return Self::PermissionDenied;
        }
        let message = err.message.to_lowercase();
        MESSAGE_TABLE
            .iter()
            .find(|(needle, _)| message.contains(needle))
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::Other)
    }

    fn message(self) -> Option<&'static str> {
        match self {
            Self::ProviderUnavailable => {
                Some("O profissional selecionado não está disponível neste horário.")
            }
            Self::BathCapacityExceeded => {
                Some("A capacidade de banho para este horário foi atingida. Escolha outro horário.")
            }
            Self::ConflictingAppointment => {
                Some("Já existe um agendamento conflitante neste horário.")
            }
            Self::PermissionDenied => Some("Você não tem permissão para realizar esta ação."),
            Self::ValidationFailed => {
                Some("Os dados do agendamento são inválidos. Revise as informações e tente novamente.")
            }
            Self::Other => None,
        }
    }
}

/// Localized message for a backend rejection; unknown errors pass the raw
/// backend text through.
pub fn user_message(err: &BackendError) -> String {
    match RejectionKind::classify(err).message() {
        Some(message) => message.to_string(),
        None => format!("Erro: {}", err.message),
    }
}
