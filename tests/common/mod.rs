//! Shared fixtures for the integration tests

#![allow(dead_code)]

use credit_score::inference::CustomerRecord;
use polars::prelude::*;

const JOBS: [&str; 4] = ["Engenheiro", "Medico", "Professor", "Advogado"];
const MIXES: [&str; 3] = ["Bom", "Normal", "Ruim"];
const BEHAVIOURS: [&str; 2] = ["Alto_gasto_Pagamento_alto", "Baixo_gasto_Pagamento_baixo"];

/// Label derived from payment delay so the classes are learnable
pub fn label_for(row: usize) -> &'static str {
    match row % 3 {
        0 => "Good",
        1 => "Standard",
        _ => "Poor",
    }
}

fn delay_for(row: usize) -> f64 {
    (row % 3) as f64 * 20.0 + (row % 5) as f64
}

/// A customer table shaped like the imported CSV, with a few gaps
pub fn customer_frame(n: usize) -> DataFrame {
    let num = |f: &dyn Fn(usize) -> f64| -> Vec<f64> { (0..n).map(f).collect() };
    let flag = |m: usize| -> Vec<i64> { (0..n).map(|i| ((i / m) % 2) as i64).collect() };

    let idade: Vec<Option<f64>> = (0..n)
        .map(|i| if i % 11 == 7 { None } else { Some(20.0 + (i % 40) as f64) })
        .collect();
    let profissao: Vec<Option<&str>> = (0..n)
        .map(|i| if i % 13 == 5 { None } else { Some(JOBS[i % JOBS.len()]) })
        .collect();

    DataFrame::new(vec![
        Column::new("id_cliente".into(), (0..n as i64).collect::<Vec<_>>()),
        Column::new("mes".into(), (0..n).map(|i| format!("m{}", i % 12)).collect::<Vec<_>>()),
        Column::new("idade".into(), idade),
        Column::new("profissao".into(), profissao),
        Column::new("salario_anual".into(), num(&|i| 20000.0 + (i * 731 % 9000) as f64)),
        Column::new("num_contas".into(), num(&|i| (i % 7) as f64)),
        Column::new("num_cartoes".into(), num(&|i| (i % 5) as f64)),
        Column::new("juros_emprestimo".into(), num(&|i| (i % 20) as f64)),
        Column::new("num_emprestimos".into(), num(&|i| (i % 4) as f64)),
        Column::new("dias_atraso".into(), num(&delay_for)),
        Column::new("num_pagamentos_atrasados".into(), num(&|i| (i % 3) as f64 * 4.0)),
        Column::new("num_verificacoes_credito".into(), num(&|i| (i % 6) as f64)),
        Column::new("mix_credito".into(), (0..n).map(|i| MIXES[i % 3]).collect::<Vec<_>>()),
        Column::new("divida_total".into(), num(&|i| (i * 37 % 5000) as f64)),
        Column::new("taxa_uso_credito".into(), num(&|i| 20.0 + (i % 15) as f64)),
        Column::new("idade_historico_credito".into(), num(&|i| (i % 300) as f64)),
        Column::new("investimento_mensal".into(), num(&|i| (i % 50) as f64 * 10.0)),
        Column::new("comportamento_pagamento".into(), (0..n).map(|i| BEHAVIOURS[i % 2]).collect::<Vec<_>>()),
        Column::new("saldo_final_mes".into(), num(&|i| 100.0 + (i % 90) as f64)),
        Column::new("emprestimo_carro".into(), flag(1)),
        Column::new("emprestimo_casa".into(), flag(2)),
        Column::new("emprestimo_pessoal".into(), flag(3)),
        Column::new("emprestimo_credito".into(), flag(4)),
        Column::new("emprestimo_estudantil".into(), flag(5)),
        Column::new("score_credito".into(), (0..n).map(label_for).collect::<Vec<_>>()),
    ])
    .unwrap()
}

/// A request body for a customer similar to row `row` of the fixture
pub fn record_like(row: usize) -> CustomerRecord {
    CustomerRecord {
        idade: 20.0 + (row % 40) as f64,
        profissao: JOBS[row % JOBS.len()].to_string(),
        salario_anual: 20000.0 + (row * 731 % 9000) as f64,
        num_contas: (row % 7) as f64,
        num_cartoes: (row % 5) as f64,
        juros_emprestimo: (row % 20) as f64,
        num_emprestimos: (row % 4) as f64,
        dias_atraso: delay_for(row),
        num_pagamentos_atrasados: (row % 3) as f64 * 4.0,
        num_verificacoes_credito: (row % 6) as f64,
        mix_credito: MIXES[row % 3].to_string(),
        divida_total: (row * 37 % 5000) as f64,
        taxa_uso_credito: 20.0 + (row % 15) as f64,
        idade_historico_credito: (row % 300) as f64,
        investimento_mensal: (row % 50) as f64 * 10.0,
        comportamento_pagamento: BEHAVIOURS[row % 2].to_string(),
        saldo_final_mes: 100.0 + (row % 90) as f64,
        emprestimo_carro: (row % 2) as i64,
        emprestimo_casa: ((row / 2) % 2) as i64,
        emprestimo_pessoal: ((row / 3) % 2) as i64,
        emprestimo_credito: ((row / 4) % 2) as i64,
        emprestimo_estudantil: ((row / 5) % 2) as i64,
    }
}
