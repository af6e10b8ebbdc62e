//! Prediction request payload

use serde::{Deserialize, Serialize};

/// One customer's attributes as submitted for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub idade: f64,
    pub profissao: String,
    pub salario_anual: f64,
    pub num_contas: f64,
    pub num_cartoes: f64,
    pub juros_emprestimo: f64,
    pub num_emprestimos: f64,
    pub dias_atraso: f64,
    pub num_pagamentos_atrasados: f64,
    pub num_verificacoes_credito: f64,
    pub mix_credito: String,
    pub divida_total: f64,
    pub taxa_uso_credito: f64,
    pub idade_historico_credito: f64,
    pub investimento_mensal: f64,
    pub comportamento_pagamento: String,
    pub saldo_final_mes: f64,
    pub emprestimo_carro: i64,
    pub emprestimo_casa: i64,
    pub emprestimo_pessoal: i64,
    pub emprestimo_credito: i64,
    pub emprestimo_estudantil: i64,
}

/// A record field's raw value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    Category(&'a str),
}

impl CustomerRecord {
    /// Field names in declaration order
    pub const FIELD_NAMES: [&'static str; 22] = [
        "idade",
        "profissao",
        "salario_anual",
        "num_contas",
        "num_cartoes",
        "juros_emprestimo",
        "num_emprestimos",
        "dias_atraso",
        "num_pagamentos_atrasados",
        "num_verificacoes_credito",
        "mix_credito",
        "divida_total",
        "taxa_uso_credito",
        "idade_historico_credito",
        "investimento_mensal",
        "comportamento_pagamento",
        "saldo_final_mes",
        "emprestimo_carro",
        "emprestimo_casa",
        "emprestimo_pessoal",
        "emprestimo_credito",
        "emprestimo_estudantil",
    ];

    /// Whether `name` is a text field
    pub fn is_categorical(name: &str) -> bool {
        matches!(name, "profissao" | "mix_credito" | "comportamento_pagamento")
    }

    /// Look up a field by column name
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        use FieldValue::{Category, Number};
        let value = match name {
            "idade" => Number(self.idade),
            "profissao" => Category(&self.profissao),
            "salario_anual" => Number(self.salario_anual),
            "num_contas" => Number(self.num_contas),
            "num_cartoes" => Number(self.num_cartoes),
            "juros_emprestimo" => Number(self.juros_emprestimo),
            "num_emprestimos" => Number(self.num_emprestimos),
            "dias_atraso" => Number(self.dias_atraso),
            "num_pagamentos_atrasados" => Number(self.num_pagamentos_atrasados),
            "num_verificacoes_credito" => Number(self.num_verificacoes_credito),
            "mix_credito" => Category(&self.mix_credito),
            "divida_total" => Number(self.divida_total),
            "taxa_uso_credito" => Number(self.taxa_uso_credito),
            "idade_historico_credito" => Number(self.idade_historico_credito),
            "investimento_mensal" => Number(self.investimento_mensal),
            "comportamento_pagamento" => Category(&self.comportamento_pagamento),
            "saldo_final_mes" => Number(self.saldo_final_mes),
            "emprestimo_carro" => Number(self.emprestimo_carro as f64),
            "emprestimo_casa" => Number(self.emprestimo_casa as f64),
            "emprestimo_pessoal" => Number(self.emprestimo_pessoal as f64),
            "emprestimo_credito" => Number(self.emprestimo_credito as f64),
            "emprestimo_estudantil" => Number(self.emprestimo_estudantil as f64),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_record() -> CustomerRecord {
        CustomerRecord {
            idade: 35.0,
            profissao: "Engenheiro".to_string(),
            salario_anual: 85000.0,
            num_contas: 3.0,
            num_cartoes: 2.0,
            juros_emprestimo: 7.5,
            num_emprestimos: 1.0,
            dias_atraso: 0.0,
            num_pagamentos_atrasados: 0.0,
            num_verificacoes_credito: 2.0,
            mix_credito: "Bom".to_string(),
            divida_total: 1200.0,
            taxa_uso_credito: 25.0,
            idade_historico_credito: 120.0,
            investimento_mensal: 500.0,
            comportamento_pagamento: "Alto_gasto_Pagamento_alto".to_string(),
            saldo_final_mes: 3000.0,
            emprestimo_carro: 1,
            emprestimo_casa: 0,
            emprestimo_pessoal: 0,
            emprestimo_credito: 0,
            emprestimo_estudantil: 0,
        }
    }

    #[test]
    fn test_every_field_resolves() {
        let record = sample_record();
        for name in CustomerRecord::FIELD_NAMES {
            let value = record.field(name).unwrap();
            assert_eq!(
                matches!(value, FieldValue::Category(_)),
                CustomerRecord::is_categorical(name),
                "{name}"
            );
        }
        assert!(record.field("score_credito").is_none());
    }

    #[test]
    fn test_json_missing_field_rejected() {
        let mut value = serde_json::to_value(sample_record()).unwrap();
        value.as_object_mut().unwrap().remove("idade");
        assert!(serde_json::from_value::<CustomerRecord>(value).is_err());
    }

    #[test]
    fn test_json_extra_field_ignored() {
        let mut value = serde_json::to_value(sample_record()).unwrap();
        value.as_object_mut().unwrap().insert("extra".into(), serde_json::json!(1));
        assert_eq!(serde_json::from_value::<CustomerRecord>(value).unwrap(), sample_record());
    }
}
