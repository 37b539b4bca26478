//! Grounding text for the inference call
//!
//! Pure and deterministic: the same tasks and question always produce the
//! same bytes. The model is told to answer in Brazilian Portuguese using only
//! the task data rendered here.

use domain::entities::TaskSnapshot;
use std::fmt::Write;

const PREAMBLE: &str = "INSTRUÇÕES DO SISTEMA:
Você é um assistente especializado em produtividade pessoal e organização de rotinas. Sua função é ajudar o usuário com suas tarefas diárias de forma prática e objetiva.

DIRETRIZES OBRIGATÓRIAS:
1. SEMPRE responda em português brasileiro
2. Seja direto, claro e conciso - evite textos longos
3. Foque apenas em produtividade, organização e gestão de tarefas
4. NUNCA faça pesquisas na internet - use APENAS o contexto fornecido
5. NÃO acesse dados externos - trabalhe apenas com as informações das tarefas do usuário
6. Se não souber algo específico, seja honesto e ofereça alternativas práticas
7. Mantenha tom amigável mas profissional
8. Dê respostas acionáveis - sempre inclua próximos passos ou sugestões práticas
9. IMPORTANTE: Responda APENAS com base nas tarefas cadastradas pelo usuário";

const ROUTINE_STRUCTURE: &str = "ESTRUTURA DA ROTINA:
O usuário organiza suas tarefas em dois modelos:
1. Rotina de dias úteis (segunda a sexta-feira)
2. Rotina de fim de semana (sábado e domingo)";

const CLOSING: &str = "Responda considerando EXCLUSIVAMENTE o contexto das tarefas acima. NÃO faça pesquisas externas.";

pub const EMPTY_WEEKDAYS: &str = "Nenhuma tarefa cadastrada para dias da semana";
pub const EMPTY_WEEKENDS: &str = "Nenhuma tarefa cadastrada para fim de semana";

const COMPLETED_LABEL: &str = "Concluída";
const PENDING_LABEL: &str = "Pendente";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub with_time: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[TaskSnapshot]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
            with_time: tasks.iter().filter(|t| t.display_time().is_some()).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingContext {
    pub text: String,
    pub stats: TaskStats,
}

/// `- <title>[ (<time>)][ - <description>] - <Concluída|Pendente>`
pub fn render_task_line(task: &TaskSnapshot) -> String {
    let mut line = format!("- {}", task.title);
    if let Some(time) = task.display_time() {
        let _ = write!(line, " ({})", time);
    }
    if let Some(description) = task.display_description() {
        let _ = write!(line, " - {}", description);
    }
    let status = if task.completed {
        COMPLETED_LABEL
    } else {
        PENDING_LABEL
    };
    let _ = write!(line, " - {}", status);
    line
}

fn render_group<'a>(tasks: impl Iterator<Item = &'a TaskSnapshot>, empty: &str) -> String {
    let lines: Vec<String> = tasks.map(render_task_line).collect();
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}

pub fn build_grounding(tasks: &[TaskSnapshot], question: &str) -> GroundingContext {
    let stats = TaskStats::from_tasks(tasks);
    let weekdays = render_group(tasks.iter().filter(|t| !t.is_weekend), EMPTY_WEEKDAYS);
    let weekends = render_group(tasks.iter().filter(|t| t.is_weekend), EMPTY_WEEKENDS);

    let text = format!(
        "{PREAMBLE}

CONTEXTO COMPLETO DO USUÁRIO:

TAREFAS DOS DIAS DA SEMANA (Segunda a Sexta):
{weekdays}

TAREFAS DO FIM DE SEMANA (Sábado e Domingo):
{weekends}

RESUMO ESTATÍSTICO:
- Total de tarefas: {total}
- Tarefas concluídas: {completed}
- Tarefas pendentes: {pending}
- Tarefas com horário: {with_time}

{ROUTINE_STRUCTURE}

PERGUNTA DO USUÁRIO: {question}

{CLOSING}",
        total = stats.total,
        completed = stats.completed,
        pending = stats.pending,
        with_time = stats.with_time,
    );

    GroundingContext { text, stats }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, time: Option<&str>, completed: bool, is_weekend: bool) -> TaskSnapshot {
        TaskSnapshot {
            title: title.to_string(),
            time: time.map(str::to_string),
            completed,
            description: None,
            is_weekend,
        }
    }

    #[test]
    fn test_task_line_variants() {
        let mut t = task("Exercício", Some("07:00"), false, false);
        assert_eq!(render_task_line(&t), "- Exercício (07:00) - Pendente");

        t.description = Some("30 minutos".to_string());
        t.completed = true;
        assert_eq!(
            render_task_line(&t),
            "- Exercício (07:00) - 30 minutos - Concluída"
        );

        let bare = task("Leitura", Some(""), false, false);
        assert_eq!(render_task_line(&bare), "- Leitura - Pendente");
    }

    #[test]
    fn test_empty_task_list() {
        let context = build_grounding(&[], "oi");
        assert_eq!(context.stats, TaskStats::default());
        assert!(context.text.contains(EMPTY_WEEKDAYS));
        assert!(context.text.contains(EMPTY_WEEKENDS));
        assert!(context.text.contains("- Total de tarefas: 0"));
        assert!(context.text.contains("- Tarefas com horário: 0"));
    }

    #[test]
    fn test_weekday_question_scenario() {
        let tasks = vec![task("Exercício", Some("07:00"), false, false)];
        let context = build_grounding(&tasks, "o que tenho pra hoje?");

        let weekday_block = context
            .text
            .split("TAREFAS DOS DIAS DA SEMANA (Segunda a Sexta):\n")
            .nth(1)
            .and_then(|rest| rest.split("\n\n").next())
            .unwrap();
        assert_eq!(weekday_block, "- Exercício (07:00) - Pendente");

        let weekend_block = context
            .text
            .split("TAREFAS DO FIM DE SEMANA (Sábado e Domingo):\n")
            .nth(1)
            .and_then(|rest| rest.split("\n\n").next())
            .unwrap();
        assert_eq!(weekend_block, EMPTY_WEEKENDS);
        assert!(context.text.contains("PERGUNTA DO USUÁRIO: o que tenho pra hoje?"));
    }

    #[test]
    fn test_stats_and_determinism() {
        let tasks = vec![
            task("Exercício", Some("07:00"), true, false),
            task("Leitura", None, false, false),
            task("Feira", Some("09:30"), false, true),
        ];
        let first = build_grounding(&tasks, "resumo");
        let second = build_grounding(&tasks, "resumo");
        assert_eq!(first, second);
        assert_eq!(
            first.stats,
            TaskStats {
                total: 3,
                completed: 1,
                pending: 2,
                with_time: 2
            }
        );
        assert!(first
            .text
            .contains("- Exercício (07:00) - Concluída\n- Leitura - Pendente"));
        assert!(first.text.starts_with("INSTRUÇÕES DO SISTEMA:"));
        assert!(first.text.ends_with("NÃO faça pesquisas externas."));
    }
}
