use std::sync::Arc;

use tracing::error;

use frontdesk_core::domain::enrollment::{Career, EnrollmentStatistics, Student};
use frontdesk_core::domain::intent::{Confidence, ERROR_INTENT};
use frontdesk_core::domain::report::ReportKind;
use frontdesk_core::domain::utterance::Utterance;
use frontdesk_db::repositories::{EnrollmentRepository, RepositoryError};

use crate::composer::{RouteOutcome, StructuredPayload};
use crate::reports::{download_path, ReportService, ReportSummary};

/// Pending students listed inline before the reply is truncated.
pub const PENDING_LIST_LIMIT: usize = 10;

/// University topics, in the order their cues are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopicGroup {
    Students,
    Statistics,
    Enrollment,
    Reports,
    Careers,
}

impl TopicGroup {
    pub const ORDERED: [TopicGroup; 5] =
        [Self::Students, Self::Statistics, Self::Enrollment, Self::Reports, Self::Careers];

    pub fn cues(self) -> &'static [&'static str] {
        match self {
            Self::Students => &["estudiante", "alumno", "matricula", "matrícula"],
            Self::Statistics => {
                &["total", "cuántos", "cuantos", "estadística", "estadistica", "estadísticas"]
            }
            Self::Enrollment => &["inscripción", "inscripcion", "pago", "debe", "pendiente"],
            Self::Reports => &["reporte", "archivo", "descargar", "generar", "excel"],
            Self::Careers => &["carrera", "ingeniería", "sistemas", "industrial", "contaduría"],
        }
    }

    /// First group with a cue contained in the utterance.
    pub fn detect(utterance: &Utterance) -> Option<Self> {
        Self::ORDERED.into_iter().find(|group| utterance.contains_any(group.cues()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Statistics => "statistics",
            Self::Enrollment => "enrollment",
            Self::Reports => "reports",
            Self::Careers => "careers",
        }
    }
}

const PENDING_DETAIL_CUES: &[&str] = &["pendiente", "debe"];
const REPORT_ENROLLMENT_CUES: &[&str] = &["inscrit", "adeud"];

/// Answers university-data questions from the enrollment store.
pub struct DomainQueryRouter {
    enrollment: Arc<dyn EnrollmentRepository>,
    reports: Arc<ReportService>,
}

impl DomainQueryRouter {
    pub fn new(enrollment: Arc<dyn EnrollmentRepository>, reports: Arc<ReportService>) -> Self {
        Self { enrollment, reports }
    }

    pub fn detect(&self, utterance: &Utterance) -> Option<TopicGroup> {
        TopicGroup::detect(utterance)
    }

    /// Runs the handler for `group`. Store failures become an apology reply.
    pub async fn route(&self, utterance: &Utterance, group: TopicGroup) -> RouteOutcome {
        match group {
            TopicGroup::Students => self.students(utterance).await,
            TopicGroup::Statistics => self.statistics().await,
            TopicGroup::Enrollment => self.enrollment(utterance).await,
            TopicGroup::Reports => self.reports(utterance).await,
            TopicGroup::Careers => self.careers().await,
        }
    }

    async fn students(&self, utterance: &Utterance) -> RouteOutcome {
        if !utterance.contains("total") {
            return RouteOutcome::text(
                "Puedo darte información sobre estudiantes. Por ejemplo, pregúntame por el total de estudiantes o por las inscripciones pendientes.",
                "estudiantes",
                Confidence::CLARIFY,
            );
        }

        match self.enrollment.fetch_statistics().await {
            Ok(Some(statistics)) => RouteOutcome::text(
                format!("Actualmente hay {} estudiantes registrados.", statistics.total),
                "estudiantes_total",
                Confidence::MATCHED,
            )
            .with_payload(StructuredPayload::Statistics(statistics)),
            Ok(None) => RouteOutcome::text(
                "Por el momento no hay estudiantes registrados.",
                "estudiantes_total",
                Confidence::DEFAULT,
            ),
            Err(store_error) => store_failure(
                TopicGroup::Students,
                &store_error,
                "Lo siento, no pude consultar el total de estudiantes en este momento.",
            ),
        }
    }

    async fn statistics(&self) -> RouteOutcome {
        match self.enrollment.fetch_statistics().await {
            Ok(Some(statistics)) => RouteOutcome::text(
                statistics_summary(&statistics),
                "estadisticas_universidad",
                Confidence::MATCHED,
            )
            .with_payload(StructuredPayload::Statistics(statistics)),
            Ok(None) => RouteOutcome::text(
                "Lo siento, todavía no hay datos de estudiantes para calcular estadísticas.",
                "estadisticas_universidad",
                Confidence::DEFAULT,
            ),
            Err(store_error) => store_failure(
                TopicGroup::Statistics,
                &store_error,
                "Lo siento, no pude obtener las estadísticas de la universidad en este momento.",
            ),
        }
    }

    async fn enrollment(&self, utterance: &Utterance) -> RouteOutcome {
        if !utterance.contains_any(PENDING_DETAIL_CUES) {
            return RouteOutcome::text(
                "Puedo ayudarte con las inscripciones. ¿Quieres saber qué estudiantes tienen su inscripción pendiente de pago?",
                "inscripciones",
                Confidence::KEYWORD,
            );
        }

        match self.enrollment.fetch_pending_enrollment_students().await {
            Ok(students) if students.is_empty() => RouteOutcome::text(
                "¡Buenas noticias! No hay estudiantes con inscripción pendiente.",
                "inscripciones_pendientes",
                Confidence::MATCHED,
            )
            .with_payload(StructuredPayload::Students(students)),
            Ok(students) => RouteOutcome::text(
                pending_summary(&students),
                "inscripciones_pendientes",
                Confidence::MATCHED,
            )
            .with_payload(StructuredPayload::Students(students)),
            Err(store_error) => store_failure(
                TopicGroup::Enrollment,
                &store_error,
                "Lo siento, no pude consultar las inscripciones pendientes en este momento.",
            ),
        }
    }

    async fn reports(&self, utterance: &Utterance) -> RouteOutcome {
        if !utterance.contains_any(REPORT_ENROLLMENT_CUES) {
            return RouteOutcome::text(report_menu(), "reportes", Confidence::CLARIFY);
        }

        match self.reports.generate(ReportKind::InscripcionesPendientes).await {
            Ok(descriptor) => {
                let summary = ReportSummary::from(&descriptor);
                RouteOutcome::text(
                    format!(
                        "Reporte generado: {}.\nID: {}\nTotal de registros: {}\nPuedes descargarlo en Excel ({}) o en PDF ({}).",
                        descriptor.kind.title(),
                        summary.id,
                        summary.total_registros,
                        summary.descarga_excel,
                        summary.descarga_pdf,
                    ),
                    "reporte_generado",
                    Confidence::MATCHED,
                )
                .with_payload(StructuredPayload::Report(summary))
            }
            Err(store_error) => store_failure(
                TopicGroup::Reports,
                &store_error,
                "Lo siento, no pude generar el reporte en este momento.",
            ),
        }
    }

    async fn careers(&self) -> RouteOutcome {
        match self.enrollment.fetch_careers().await {
            Ok(careers) if careers.is_empty() => RouteOutcome::text(
                "Por el momento no hay carreras activas registradas.",
                "carreras",
                Confidence::DEFAULT,
            )
            .with_payload(StructuredPayload::Careers(careers)),
            Ok(careers) => {
                RouteOutcome::text(career_summary(&careers), "carreras", Confidence::MATCHED)
                    .with_payload(StructuredPayload::Careers(careers))
            }
            Err(store_error) => store_failure(
                TopicGroup::Careers,
                &store_error,
                "Lo siento, no pude consultar el catálogo de carreras en este momento.",
            ),
        }
    }
}

fn store_failure(group: TopicGroup, store_error: &RepositoryError, apology: &str) -> RouteOutcome {
    error!(
        event_name = "agent.router.store_failed",
        topic = group.as_str(),
        error = %store_error,
        "university data query failed"
    );
    RouteOutcome::text(apology, ERROR_INTENT, Confidence::NONE)
}

fn statistics_summary(statistics: &EnrollmentStatistics) -> String {
    let mut lines = vec![
        "Estadísticas de la universidad:".to_string(),
        format!("• Total de estudiantes: {}", statistics.total),
        format!("• Inscripciones pagadas: {}", statistics.paid),
        format!("• Inscripciones pendientes: {}", statistics.pending),
    ];
    if !statistics.by_career.is_empty() {
        lines.push(String::new());
        lines.push("Estudiantes por carrera:".to_string());
        lines.extend(
            statistics
                .by_career
                .iter()
                .map(|entry| format!("• {}: {}", entry.career, entry.count)),
        );
    }
    lines.join("\n")
}

fn pending_summary(students: &[Student]) -> String {
    let mut lines = vec![format!("Estudiantes con inscripción pendiente ({}):", students.len())];
    lines.extend(students.iter().take(PENDING_LIST_LIMIT).map(|student| {
        format!(
            "• {} - {} ({}, semestre {}) inscrito el {}",
            student.matricula,
            student.full_name(),
            student.career_label(),
            student.semester,
            student.enrolled_on.format("%Y-%m-%d"),
        )
    }));
    if students.len() > PENDING_LIST_LIMIT {
        lines.push(format!("... y {} más", students.len() - PENDING_LIST_LIMIT));
    }
    lines.join("\n")
}

fn career_summary(careers: &[Career]) -> String {
    let mut lines = vec!["Carreras disponibles:".to_string()];
    lines.extend(careers.iter().map(|career| {
        format!(
            "• {} ({}) - {} semestres - inscripción ${:.2}",
            career.name, career.code, career.duration_semesters, career.enrollment_cost
        )
    }));
    lines.join("\n")
}

fn report_menu() -> String {
    let mut lines = vec!["Puedo generar los siguientes reportes:".to_string()];
    lines.extend(
        ReportKind::ALL
            .iter()
            .map(|kind| format!("• {} ({})", kind.title(), download_path(*kind))),
    );
    lines.push("Por ejemplo: \"generar reporte de inscritos con adeudo\".".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use frontdesk_core::domain::enrollment::{Career, Student};
    use frontdesk_core::domain::intent::{Confidence, ERROR_INTENT};
    use frontdesk_core::domain::utterance::Utterance;
    use frontdesk_db::repositories::InMemoryCampusStore;

    use super::{DomainQueryRouter, TopicGroup};
    use crate::composer::StructuredPayload;
    use crate::reports::ReportService;

    fn utterance(text: &str) -> Utterance {
        Utterance::new(text, None).expect("non-empty utterance")
    }

    fn student(index: u32, paid: bool) -> Student {
        Student {
            matricula: format!("A{index:04}"),
            first_name: "Alumno".to_string(),
            last_name: format!("Número {index}"),
            career_code: "ISC".to_string(),
            career_name: None,
            semester: 1,
            enrolled_on: NaiveDate::from_ymd_opt(2026, 8, index.clamp(1, 28)).expect("valid date"),
            enrollment_paid: paid,
            email: None,
            phone: None,
        }
    }

    fn career(code: &str, name: &str) -> Career {
        Career {
            code: code.to_string(),
            name: name.to_string(),
            duration_semesters: 9,
            enrollment_cost: Decimal::new(450_000, 2),
            active: true,
        }
    }

    fn router_over(store: InMemoryCampusStore) -> (Arc<InMemoryCampusStore>, DomainQueryRouter) {
        let store = Arc::new(store);
        let reports = Arc::new(ReportService::new(store.clone(), store.clone()));
        (store.clone(), DomainQueryRouter::new(store, reports))
    }

    #[test]
    fn groups_are_checked_in_priority_order() {
        assert_eq!(TopicGroup::detect(&utterance("total de alumnos")), Some(TopicGroup::Students));
        assert_eq!(
            TopicGroup::detect(&utterance("estadísticas de ingeniería")),
            Some(TopicGroup::Statistics)
        );
        assert_eq!(
            TopicGroup::detect(&utterance("¿quién debe su pago?")),
            Some(TopicGroup::Enrollment)
        );
        assert_eq!(TopicGroup::detect(&utterance("descargar excel")), Some(TopicGroup::Reports));
        assert_eq!(
            TopicGroup::detect(&utterance("contaduría pública")),
            Some(TopicGroup::Careers)
        );
        assert_eq!(TopicGroup::detect(&utterance("horario de atención")), None);
    }

    #[tokio::test]
    async fn statistics_question_about_engineering_is_not_a_career_query() {
        let (_, router) = router_over(
            InMemoryCampusStore::new()
                .with_careers(vec![career("ISC", "Ingeniería en Sistemas")])
                .with_students(vec![student(1, true), student(2, false)]),
        );
        let question = utterance("estadísticas de ingeniería");

        let group = router.detect(&question).expect("topic");
        let outcome = router.route(&question, group).await;

        assert_eq!(outcome.classification.intent, "estadisticas_universidad");
        assert_eq!(outcome.classification.confidence, Confidence::MATCHED);
        match outcome.payload {
            StructuredPayload::Statistics(statistics) => {
                assert!(statistics.is_consistent());
                assert_eq!(statistics.pending, 1);
            }
            other => panic!("expected statistics payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn student_total_reports_count() {
        let (_, router) =
            router_over(InMemoryCampusStore::new().with_students(vec![student(1, true)]));

        let outcome = router.route(&utterance("total de estudiantes"), TopicGroup::Students).await;
        assert_eq!(outcome.classification.intent, "estudiantes_total");
        assert!(outcome.classification.response.contains('1'));

        let prompt = router.route(&utterance("busco a un alumno"), TopicGroup::Students).await;
        assert_eq!(prompt.classification.intent, "estudiantes");
        assert_eq!(prompt.classification.confidence, Confidence::CLARIFY);
    }

    #[tokio::test]
    async fn pending_list_truncates_after_ten_entries() {
        let students = (1..=12).map(|index| student(index, false)).collect();
        let (_, router) = router_over(InMemoryCampusStore::new().with_students(students));

        let outcome =
            router.route(&utterance("¿quiénes tienen inscripción pendiente?"), TopicGroup::Enrollment).await;

        let response = &outcome.classification.response;
        assert_eq!(outcome.classification.intent, "inscripciones_pendientes");
        assert_eq!(response.lines().filter(|line| line.starts_with('•')).count(), 10);
        assert!(response.ends_with("... y 2 más"));
        assert!(response.contains("A0012"), "most recent enrollment is listed first");
        match outcome.payload {
            StructuredPayload::Students(listed) => assert_eq!(listed.len(), 12),
            other => panic!("expected students payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_pending_students_is_good_news() {
        let (_, router) =
            router_over(InMemoryCampusStore::new().with_students(vec![student(1, true)]));

        let outcome = router.route(&utterance("¿quién debe?"), TopicGroup::Enrollment).await;

        assert_eq!(outcome.classification.intent, "inscripciones_pendientes");
        assert_eq!(outcome.classification.confidence, Confidence::MATCHED);
        assert!(outcome.classification.response.contains("No hay estudiantes"));
    }

    #[tokio::test]
    async fn generic_enrollment_question_gets_prompt() {
        let (_, router) = router_over(InMemoryCampusStore::new());

        let outcome = router.route(&utterance("info de inscripción"), TopicGroup::Enrollment).await;

        assert_eq!(outcome.classification.intent, "inscripciones");
        assert_eq!(outcome.classification.confidence, Confidence::KEYWORD);
        assert_eq!(outcome.payload, StructuredPayload::None);
    }

    #[tokio::test]
    async fn report_request_generates_and_records_pending_report() {
        let (store, router) =
            router_over(InMemoryCampusStore::new().with_students(vec![student(3, false)]));

        let outcome =
            router.route(&utterance("generar reporte de inscritos con adeudo"), TopicGroup::Reports).await;

        assert_eq!(outcome.classification.intent, "reporte_generado");
        assert_eq!(outcome.classification.confidence, Confidence::MATCHED);
        assert!(matches!(outcome.payload, StructuredPayload::Report(ref summary) if summary.total_registros == 1));
        assert_eq!(store.stored_reports().await.len(), 1);

        let menu = router.route(&utterance("descargar un archivo"), TopicGroup::Reports).await;
        assert_eq!(menu.classification.intent, "reportes");
        assert_eq!(menu.classification.confidence, Confidence::CLARIFY);
    }

    #[tokio::test]
    async fn careers_are_listed_with_cost() {
        let (_, router) = router_over(
            InMemoryCampusStore::new().with_careers(vec![career("II", "Ingeniería Industrial")]),
        );

        let outcome = router.route(&utterance("carreras"), TopicGroup::Careers).await;

        assert_eq!(outcome.classification.intent, "carreras");
        assert!(outcome.classification.response.contains("Ingeniería Industrial (II)"));
        assert!(outcome.classification.response.contains("$4500.00"));

        let (_, empty_router) = router_over(InMemoryCampusStore::new());
        let empty = empty_router.route(&utterance("carreras"), TopicGroup::Careers).await;
        assert_eq!(empty.classification.confidence, Confidence::DEFAULT);
    }

    #[tokio::test]
    async fn store_failure_becomes_error_reply() {
        let (store, router) = router_over(InMemoryCampusStore::new());
        store.set_unavailable(true);

        for (text, group) in [
            ("total de estudiantes", TopicGroup::Students),
            ("estadísticas", TopicGroup::Statistics),
            ("pendientes", TopicGroup::Enrollment),
            ("reporte de inscritos", TopicGroup::Reports),
            ("carreras", TopicGroup::Careers),
        ] {
            let outcome = router.route(&utterance(text), group).await;
            assert_eq!(outcome.classification.intent, ERROR_INTENT, "{text}");
            assert_eq!(outcome.classification.confidence, Confidence::NONE);
            assert!(outcome.classification.response.starts_with("Lo siento"));
        }
    }
}
