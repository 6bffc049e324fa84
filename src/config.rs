//! Configuração do roster carregada a partir de `roster.toml`.
//!
//! A struct [`RosterConfig`] contém os atrasos do fluxo de trabalho e a
//! semente opcional do gerador de notas. Valores ausentes no arquivo usam
//! defaults sensíveis. A variável de ambiente `ROSTER_SEED` tem precedência
//! sobre o arquivo.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::classroom::Timing;
use crate::error::{Result, RosterError};

/// Nome do arquivo de configuração procurado no diretório atual.
pub const CONFIG_FILE: &str = "roster.toml";

/// Configuração de nível superior carregada de `roster.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterConfig {
    /// Atraso entre começar uma tarefa e a entrega automática.
    #[serde(default = "default_work_delay_ms")]
    pub work_delay_ms: u64,

    /// Atraso entre a entrega e a correção.
    #[serde(default = "default_grading_delay_ms")]
    pub grading_delay_ms: u64,

    /// Quando a varredura de lembretes roda na demonstração.
    #[serde(default = "default_reminder_after_ms")]
    pub reminder_after_ms: u64,

    /// Semente para notas reproduzíveis. Sem semente, as notas são aleatórias.
    #[serde(default)]
    pub seed: Option<u64>,
}

// Valor padrão para o atraso de trabalho: 500ms.
fn default_work_delay_ms() -> u64 {
    500
}

// Valor padrão para o atraso de correção: 500ms.
fn default_grading_delay_ms() -> u64 {
    500
}

// Valor padrão para o lembrete: 200ms.
fn default_reminder_after_ms() -> u64 {
    200
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            work_delay_ms: default_work_delay_ms(),
            grading_delay_ms: default_grading_delay_ms(),
            reminder_after_ms: default_reminder_after_ms(),
            seed: None,
        }
    }
}

impl RosterConfig {
    /// Carrega a configuração de `roster.toml` no diretório atual.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Carrega a configuração do caminho fornecido.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<RosterConfig>(&contents)?
        } else {
            Self::default()
        };

        if let Ok(raw) = std::env::var("ROSTER_SEED")
            && !raw.is_empty()
        {
            config.seed = Some(raw.parse().map_err(|_| {
                RosterError::Config(format!("ROSTER_SEED must be an unsigned integer, got {raw:?}"))
            })?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejeita atrasos nulos, que fariam a entrega acontecer no mesmo instante.
    pub fn validate(&self) -> Result<()> {
        if self.work_delay_ms == 0 {
            return Err(RosterError::Config("work_delay_ms must be positive".into()));
        }
        if self.grading_delay_ms == 0 {
            return Err(RosterError::Config("grading_delay_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            work_delay: Duration::from_millis(self.work_delay_ms),
            grading_delay: Duration::from_millis(self.grading_delay_ms),
        }
    }

    /// Tempo suficiente para que todo trabalho iniciado seja entregue e corrigido.
    pub fn settle_time(&self) -> Duration {
        Duration::from_millis(self.work_delay_ms + self.grading_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = RosterConfig::default();
        assert_eq!(config.work_delay_ms, 500);
        assert_eq!(config.grading_delay_ms, 500);
        assert_eq!(config.reminder_after_ms, 200);
        assert!(config.seed.is_none());
        assert_eq!(config.timing(), Timing::default());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            work_delay_ms = 50
            seed = 42
        "#;
        let config: RosterConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.work_delay_ms, 50);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.grading_delay_ms, 500);
        assert_eq!(config.timing().work_delay, Duration::from_millis(50));
        assert_eq!(config.settle_time(), Duration::from_millis(550));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "grading_delay_ms = 75\nreminder_after_ms = 10").unwrap();

        let config = RosterConfig::load_from(file.path()).unwrap();
        assert_eq!(config.grading_delay_ms, 75);
        assert_eq!(config.reminder_after_ms, 10);
        assert_eq!(config.work_delay_ms, 500);
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RosterConfig::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.work_delay_ms, 500);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "work_delay_ms = \"soon\"").unwrap();
        assert!(matches!(
            RosterConfig::load_from(file.path()),
            Err(RosterError::Toml(_))
        ));
    }

    #[test]
    fn zero_delay_is_rejected() {
        let config = RosterConfig {
            grading_delay_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RosterError::Config(_))));
    }
}
