//! Interface de terminal do roster — spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de espera e `console` para
//! estilização com cores. O [`SessionProgress`] também é o [`Notifier`]
//! da sessão: as notificações são impressas acima do spinner.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use roster::{AssignmentStatus, Notifier, RosterReport};

/// Indicador visual de progresso de uma sessão da turma.
///
/// Exibe um spinner enquanto os temporizadores correm e imprime as
/// notificações sem embaralhar a saída.
pub struct SessionProgress {
    // Spinner do indicatif.
    pb: ProgressBar,
    // Estilo ciano para o prefixo das notificações.
    cyan: Style,
}

impl SessionProgress {
    /// Cria o spinner, ainda parado.
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self {
            pb,
            cyan: Style::new().cyan(),
        }
    }

    /// Atualiza a mensagem do spinner e começa a animá-lo.
    pub fn waiting(&self, message: impl Into<String>) {
        self.pb.set_message(message.into());
        self.pb.enable_steady_tick(Duration::from_millis(100));
    }

    /// Para e remove o spinner.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Default for SessionProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for SessionProgress {
    fn notify(&self, message: &str) {
        self.pb
            .suspend(|| println!("{} {message}", self.cyan.apply_to("Observer -->")));
    }
}

/// Imprime o relatório final: uma linha por tarefa e a média de cada aluno.
///
/// Aprovado em verde, reprovado em vermelho, pendente em amarelo.
pub fn print_report(report: &RosterReport) {
    let green = Style::new().green().bold();
    let red = Style::new().red().bold();
    let yellow = Style::new().yellow();
    let bold = Style::new().bold();

    println!();
    println!("{}", bold.apply_to("─── Classlist ───"));
    for student in &report.students {
        let overall = student
            .overall_grade
            .map(|g| format!("{g:.1}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{} <{}>  overall: {}",
            bold.apply_to(&student.full_name),
            student.email,
            overall
        );
        for assignment in &student.assignments {
            let style = match assignment.status {
                AssignmentStatus::Passed => &green,
                AssignmentStatus::Failed => &red,
                _ => &yellow,
            };
            let score = assignment
                .score
                .map(|s| format!(" ({s:.0})"))
                .unwrap_or_default();
            println!(
                "  {:<12} {}{score}",
                assignment.name,
                style.apply_to(&assignment.label)
            );
        }
    }
}

/// Imprime o relatório em JSON.
pub fn print_json(report: &RosterReport) -> anyhow::Result<()> {
    println!("{}", report.to_json()?);
    Ok(())
}
