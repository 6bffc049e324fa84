//! Interface de linha de comando do roster baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (demo, run)
//! e flags globais (--seed, --work-delay-ms, --json, --verbose).

use clap::{Parser, Subcommand};

/// Roster — simula uma turma entregando tarefas com notificações a cada etapa.
#[derive(Debug, Parser)]
#[command(name = "roster", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Semente para notas reproduzíveis.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Atraso entre começar uma tarefa e a entrega automática.
    #[arg(long, global = true)]
    pub work_delay_ms: Option<u64>,

    /// Imprime o relatório final em JSON.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Executa a demonstração embutida com dois alunos e duas tarefas.
    Demo,

    /// Executa uma sessão com alunos e tarefas arbitrários.
    Run {
        /// Aluno no formato "Nome <email>". Pode ser repetido.
        #[arg(long = "student", required = true, value_parser = parse_student)]
        students: Vec<StudentArg>,

        /// Nome da tarefa a liberar. Pode ser repetido.
        #[arg(long = "assignment", required = true)]
        assignments: Vec<String>,
    },
}

/// Aluno informado na linha de comando.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentArg {
    pub full_name: String,
    pub email: String,
}

/// Aceita `"Alice Smith <alice@example.com>"`; o email é opcional.
pub fn parse_student(raw: &str) -> Result<StudentArg, String> {
    let raw = raw.trim();
    let (name, email) = match raw.split_once('<') {
        Some((name, rest)) => {
            let email = rest
                .strip_suffix('>')
                .ok_or_else(|| format!("missing closing '>' in {raw:?}"))?;
            (name.trim(), email.trim())
        }
        None => (raw, ""),
    };
    if name.is_empty() {
        return Err(format!("student name is empty in {raw:?}"));
    }
    Ok(StudentArg {
        full_name: name.to_string(),
        email: email.to_string(),
    })
}
