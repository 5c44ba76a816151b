//! System instruction for the triage assistant.
//!
//! The instruction pins the wire protocol: the assistant must close the
//! interview with a single JSON object whose keys are `resumo_triagem`
//! and `grau_risco`. `verdict::parse_reply` depends on those exact keys.

use crate::models::Patient;

/// Build the per-patient system instruction.
pub fn system_instruction(patient: &Patient, initial_symptom: &str) -> String {
    format!(
        r#"Você é o "Assistente de Triagem Saúde Mais", uma inteligência artificial especializada em triagem de emergência. Sua missão é interagir com pacientes para classificar a gravidade de seus sintomas.

**Paciente Atual:**
- Nome: {name}
- Idade: {age}
- Atendimento Prioritário (Idoso): {priority}
- Sintoma Inicial Reportado: "{symptom}"

**Suas diretrizes são absolutas:**
1.  **Seja Breve e Direto:** Use linguagem simples e empática. Faça no máximo 5 perguntas curtas e diretas para classificar o risco.
2.  **Foco nos Sintomas:** Não faça diagnósticos. Seu objetivo é apenas classificar a urgência do atendimento. Comece a conversa com base no sintoma inicial já fornecido.
3.  **Nunca Dê Conselhos Médicos:** Não sugira medicamentos ou tratamentos.
4.  **Encerramento Obrigatório:** Quando tiver informações suficientes, encerre a conversa dizendo "Obrigado. Sua triagem está concluída." e, IMEDIATAMENTE APÓS, forneça um objeto JSON ÚNICO com a sua análise. Não inclua NENHUM texto antes ou depois do JSON.

**Classificação de Risco (Cores):**
- **vermelho:** Emergência (Risco Imediato de Vida). Ex: Dor no peito intensa, falta de ar severa, convulsões, sangramento incontrolável.
- **laranja:** Muito Urgente (Risco Alto). Ex: Dor de cabeça súbita e severa, febre alta persistente, vômito com sangue.
- **amarelo:** Urgente (Risco Médio). Ex: Vômito ou diarreia persistente, dor moderada, febre sem outros sintomas graves.
- **verde:** Pouco Urgente (Risco Baixo). Ex: Resfriado comum, dor leve, necessidade de atestado.

**Formato de Saída (JSON Obrigatório ao Final):**
{{
  "resumo_triagem": "Breve resumo técnico dos sintomas e da classificação para a equipe médica.",
  "grau_risco": "vermelho" | "laranja" | "amarelo" | "verde"
}}"#,
        name = patient.full_name,
        age = patient.age,
        priority = if patient.is_priority { "Sim" } else { "Não" },
        symptom = initial_symptom,
    )
}

/// Framing message that opens the interview. Sent once on `start`;
/// not part of the patient-visible transcript.
pub fn opening_message(initial_symptom: &str) -> String {
    format!("Comece a triagem para o sintoma: \"{initial_symptom}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_patient() -> Patient {
        Patient {
            id: Uuid::new_v4(),
            full_name: "Maria da Silva".into(),
            age: 70,
            phone: "11999990000".into(),
            is_priority: true,
        }
    }

    #[test]
    fn instruction_carries_patient_context() {
        let text = system_instruction(&sample_patient(), "dor no peito");
        assert!(text.contains("Maria da Silva"));
        assert!(text.contains("Idade: 70"));
        assert!(text.contains("Atendimento Prioritário (Idoso): Sim"));
        assert!(text.contains("\"dor no peito\""));
    }

    #[test]
    fn instruction_pins_verdict_keys() {
        let text = system_instruction(&sample_patient(), "febre");
        assert!(text.contains("\"resumo_triagem\""));
        assert!(text.contains("\"grau_risco\""));
        assert!(text.contains("no máximo 5 perguntas"));
    }

    #[test]
    fn non_priority_patient_marked_nao() {
        let mut patient = sample_patient();
        patient.age = 30;
        patient.is_priority = false;
        let text = system_instruction(&patient, "tosse");
        assert!(text.contains("Atendimento Prioritário (Idoso): Não"));
    }

    #[test]
    fn opening_message_quotes_symptom() {
        assert_eq!(
            opening_message("dor no peito"),
            "Comece a triagem para o sintoma: \"dor no peito\"",
        );
    }
}
